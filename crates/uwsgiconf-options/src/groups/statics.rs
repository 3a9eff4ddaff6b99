//! Static file serving.

use uwsgiconf_core::Section;

/// How static files are handed to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferMode {
    /// Delegates to the front server with `X-Sendfile`.
    XSendfile,
    /// Delegates to nginx with `X-Accel-Redirect`.
    XAccelRedirect,
}

impl TransferMode {
    const fn name(self) -> &'static str {
        match self {
            Self::XSendfile => "x-sendfile",
            Self::XAccelRedirect => "x-accel-redirect",
        }
    }
}

/// What an expiration rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpirationCriterion {
    /// Absolute file name regex.
    Filename,
    /// Request URI regex.
    RequestUri,
    /// `PATH_INFO` regex.
    PathInfo,
    /// MIME type regex.
    MimeType,
}

impl ExpirationCriterion {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Filename => "",
            Self::RequestUri => "-uri",
            Self::PathInfo => "-path-info",
            Self::MimeType => "-type",
        }
    }

    const fn separator(self) -> &'static str {
        match self {
            Self::MimeType => "=",
            _ => " ",
        }
    }
}

/// Basic static serving parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticsParams {
    /// Directories checked for static files.
    pub static_dirs: Vec<String>,
    /// Index files served for directories.
    pub index_files: Vec<String>,
    /// Extra MIME type files.
    pub mime_files: Vec<String>,
    /// Extensions never served statically.
    pub skip_ext: Vec<String>,
    /// Transfer mode.
    pub transfer_mode: Option<TransferMode>,
}

/// Statics option group.
#[derive(Debug)]
pub struct Statics<'a> {
    section: &'a mut Section,
}

impl<'a> Statics<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets basic static serving parameters.
    pub fn set_basic_params(self, params: StaticsParams) -> &'a mut Section {
        for dir in params.static_dirs {
            self.section.add("check-static", dir);
        }
        for file in params.index_files {
            self.section.add("static-index", file);
        }
        for file in params.mime_files {
            self.section.add("mime-file", file);
        }
        for ext in params.skip_ext {
            self.section.add("static-skip-ext", ext);
        }
        self.section
            .set("file-serve-mode", params.transfer_mode.map(TransferMode::name))
    }

    /// Maps a URL prefix to a directory.
    ///
    /// `retain_resource_path` keeps the prefix when resolving files;
    /// `safe_target` allows serving from a path outside the map.
    pub fn register_static_map(
        self,
        mountpoint: &str,
        target: &str,
        retain_resource_path: bool,
        safe_target: Option<&str>,
    ) -> &'a mut Section {
        let key = if retain_resource_path { "static-map2" } else { "static-map" };
        self.section
            .add(key, format!("{mountpoint}={target}"))
            .set("static-safe", safe_target)
    }

    /// Sets `Expires` for matching files, `timeout` seconds ahead.
    ///
    /// `use_mod_time` counts from the file modification time instead of the
    /// request time.
    pub fn add_expiration_rule<'s>(
        self,
        criterion: ExpirationCriterion,
        patterns: impl IntoIterator<Item = &'s str>,
        timeout: u32,
        use_mod_time: bool,
    ) -> &'a mut Section {
        let mtime = if use_mod_time { "-mtime" } else { "" };
        let key = format!("static-expires{}{mtime}", criterion.suffix());
        for pattern in patterns {
            self.section.add(
                &key,
                format!("{pattern}{}{timeout}", criterion.separator()),
            );
        }
        self.section
    }

    /// Caches resolved static paths.
    pub fn set_paths_caching_params(
        self,
        timeout: Option<u32>,
        cache_name: Option<&str>,
    ) -> &'a mut Section {
        self.section
            .set("static-cache-paths", timeout)
            .set("static-cache-paths-name", cache_name)
    }
}
