//! End-to-end rendering tests.
//!
//! Tests cover:
//! - Worker autodetection, shared HTTPS sockets, named loggers with encoders
//! - Metric thresholds, static expiration rules and conditional redirects
//! - Section-level invariants: no-op `None`, chaining, shared socket indexing,
//!   multi-valued append, plugin propagation, placeholders and DSN parsing
//! - Multi-section configurations, autoinclude, argument rendering and files

use uwsgiconf::options::groups::{
    empire::{BroodlordParams, EmperorCommandParams, TyrantParams, VassalsWrapperParams},
    locks::IpcSemParams,
    logging::{FileParams, FiltersParams, MasterLoggingParams, RequestsFiltersParams},
    main_process::{NamingParams, OnExitParams},
    networking::SslParams,
    subscriptions::{ClientParams, ServerParams},
    workers::{HarakiriParams, MulesParams, ReloadParams},
};
use uwsgiconf::prelude::routes::{actions, rule, subjects};
use uwsgiconf::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

/// Rendered `(key, value)` pairs of a section.
fn options(section: &Section) -> Vec<(String, String)> {
    section.options().unwrap()
}

/// Builds an owned `(key, value)` pair for comparisons.
fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Routes library logs to the test harness output.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("uwsgiconf=debug")
        .with_test_writer()
        .try_init();
}

/// Renders a single section as INI without a stamp.
fn ini(section: Section) -> String {
    section.as_configuration().format_ini(false).unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_workers_autodetect() {
    let mut section = Section::new("uwsgi");
    section.workers().set_count_auto(None);

    assert_eq!(ini(section), "\n[uwsgi]\nworkers = %k\n");
}

#[test]
fn test_https_on_shared_socket() {
    init_tracing();
    let shared = sockets::shared(":443");
    let mut section = Section::default();
    section
        .networking()
        .register_socket(&shared)
        .networking()
        .register_socket(sockets::https(&shared, "/c", "/k"));

    assert_eq!(
        options(&section),
        vec![pair("shared-socket", ":443"), pair("https-socket", "=0,/c,/k")]
    );
}

#[test]
fn test_named_logger_with_json_encoder() {
    let mut section = Section::default();
    section
        .logging()
        .add_logger(&loggers::file("/tmp/u.log", Some("f")), false, false)
        .logging()
        .add_logger_encoder([encoders::json(None)], Some("f"), false, false);

    assert_eq!(
        options(&section),
        vec![pair("logger", "f=file:/tmp/u.log"), pair("log-encoder", "json:f")]
    );
}

#[test]
fn test_metric_threshold() {
    let mut section = Section::default();
    section.monitoring().set_metrics_threshold(ThresholdParams {
        name: Some("foo".into()),
        value: Some("100".into()),
        check_interval: Some(2),
        alarm_message: Some("high".into()),
        ..ThresholdParams::default()
    });

    assert_eq!(
        options(&section),
        vec![pair("metric-threshold", "key=foo,value=100,rate=2,msg=high")]
    );
}

#[test]
fn test_static_expiration_by_mime_type() {
    let mut section = Section::default();
    section
        .statics()
        .add_expiration_rule(ExpirationCriterion::MimeType, ["text/html"], 60, false);

    assert_eq!(options(&section), vec![pair("static-expires-type", "text/html=60")]);
}

#[test]
fn test_conditional_https_redirect() {
    let mut section = Section::default();
    section.routing().register_route(rule(
        actions::redirect("https://${HTTP_HOST}${REQUEST_URI}", true),
        subjects::custom("${HTTPS}", true).eq("on"),
    ));

    let rendered = options(&section);
    assert_eq!(rendered.len(), 1);
    let (key, value) = &rendered[0];
    assert!(key.starts_with("route-"));
    assert!(value.contains("${HTTPS}"));
    assert!(value.contains("equal:"));
    assert!(value.contains("redirect-301:https://${HTTP_HOST}${REQUEST_URI}"));
    assert_eq!(
        rendered[0],
        pair(
            "route-if-not",
            "equal:${HTTPS};on redirect-301:https://${HTTP_HOST}${REQUEST_URI}"
        )
    );
}

// ============================================================================
// Section invariants
// ============================================================================

#[test]
fn test_all_none_setters_are_noop() {
    let mut section = Section::default();
    section.set("master", true);
    let before = options(&section);

    section
        .workers()
        .set_basic_params(WorkersParams::default())
        .workers()
        .set_thread_params(ThreadParams::default())
        .logging()
        .set_basic_params(LoggingParams::default())
        .networking()
        .set_basic_params(NetworkingParams::default())
        .networking()
        .set_socket_params(SocketParams::default())
        .monitoring()
        .set_stats_params(StatsParams::default())
        .monitoring()
        .set_metrics_params(MetricsParams::default())
        .statics()
        .set_basic_params(StaticsParams::default())
        .master_process()
        .set_basic_params(MasterParams::default())
        .main_process()
        .set_basic_params(MainProcessParams::default())
        .main_process()
        .set_owner_params(OwnerParams::default())
        .applications()
        .set_basic_params(ApplicationsParams::default())
        .locks()
        .set_basic_params(LocksParams::default())
        .alarms()
        .set_basic_params(AlarmsParams::default())
        .empire()
        .set_emperor_params(EmperorParams::default())
        .caching()
        .set_basic_params(CachingParams::default())
        .python()
        .set_basic_params(PythonParams::default())
        .python()
        .set_wsgi_params(WsgiParams::default())
        .logging()
        .set_file_params(FileParams::default())
        .logging()
        .set_filters(FiltersParams::default())
        .logging()
        .set_requests_filters(RequestsFiltersParams::default())
        .logging()
        .set_master_logging_params(MasterLoggingParams::default())
        .networking()
        .set_ssl_params(SslParams::default())
        .workers()
        .set_mules_params(MulesParams::default())
        .workers()
        .set_reload_params(ReloadParams::default())
        .workers()
        .set_harakiri_params(HarakiriParams::default())
        .main_process()
        .set_naming_params(NamingParams::default())
        .main_process()
        .set_on_exit_params(OnExitParams::default())
        .locks()
        .set_ipcsem_params(IpcSemParams::default())
        .empire()
        .set_emperor_command_params(EmperorCommandParams::default())
        .empire()
        .set_vassals_wrapper_params(VassalsWrapperParams::default())
        .empire()
        .set_mode_tyrant_params(TyrantParams::default())
        .empire()
        .set_mode_broodlord_params(BroodlordParams::default())
        .subscriptions()
        .set_server_params(ServerParams::default())
        .subscriptions()
        .set_client_params(ClientParams::default())
        .monitoring()
        .set_metrics_threshold(ThresholdParams::default())
        .statics()
        .set_paths_caching_params(None, None)
        .set_plugins_params(PluginsParams::default())
        .set_basic_params(SectionParams::default());
    section
        .networking()
        .set_unix_socket_params(UnixSocketParams::default())
        .unwrap();

    assert_eq!(options(&section), before);
}

#[test]
fn test_setters_chain_back_to_section() {
    let mut section = Section::default();
    section
        .master_process()
        .set_basic_params(MasterParams {
            enable: Some(true),
            ..MasterParams::default()
        })
        .workers()
        .set_count_auto(Some(4))
        .networking()
        .register_socket(sockets::http(":8000"))
        .print_out("ready");

    assert_eq!(
        options(&section),
        vec![
            pair("master", "true"),
            pair("workers", "4"),
            pair("http-socket", ":8000"),
            pair("print", "ready"),
        ]
    );
}

#[test]
fn test_shared_socket_indexing() {
    let shared_a = sockets::shared(":443");
    let mut section = Section::default();
    section.networking().register_socket(vec![
        sockets::http(":80"),
        sockets::http(&shared_a),
        sockets::uwsgi(&shared_a),
    ]);

    let rendered = options(&section);
    let shared: Vec<_> = rendered.iter().filter(|(k, _)| k == "shared-socket").collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(section.shared_socket_index(":443"), Some(0));
    assert!(rendered.contains(&pair("http-socket", "=0")));
    assert!(rendered.contains(&pair("uwsgi-socket", "=0")));
}

#[test]
fn test_multi_and_single_setters() {
    let mut section = Section::default();
    for module in ["a", "b", "c"] {
        section.python().import_module(module, false);
    }
    for count in [1, 2, 3] {
        section.workers().set_count_auto(Some(count));
    }

    let rendered = options(&section);
    let imports: Vec<_> = rendered
        .iter()
        .filter(|(k, _)| k == "pyimport")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(imports, vec!["a", "b", "c"]);
    let workers: Vec<_> = rendered.iter().filter(|(k, _)| k == "workers").collect();
    assert_eq!(workers, vec![&pair("workers", "3")]);
}

#[test]
fn test_plugin_precedes_its_option() {
    let value = ParamValue::new("logger", "custom").plugin("foo");
    let mut section = Section::default();
    section.set_param(&value, true).set_param(&value, true);

    let rendered = options(&section);
    let plugins: Vec<_> = rendered.iter().filter(|(k, _)| k == "plugin").collect();
    assert_eq!(plugins, vec![&pair("plugin", "foo")]);
    let plugin_at = rendered.iter().position(|(k, _)| k == "plugin").unwrap();
    let logger_at = rendered.iter().position(|(k, _)| k == "logger").unwrap();
    assert!(plugin_at < logger_at);
}

#[test]
fn test_plugin_precedes_option_written_earlier() {
    let mut section = Section::default();
    section
        .workers()
        .set_thread_params(ThreadParams {
            enable: Some(true),
            ..ThreadParams::default()
        })
        .python()
        .set_basic_params(PythonParams {
            enable_threads: Some(true),
            ..PythonParams::default()
        });

    let rendered = options(&section);
    let plugin_at = rendered.iter().position(|(k, _)| k == "plugin").unwrap();
    let threads_at = rendered.iter().position(|(k, _)| k == "enable-threads").unwrap();
    assert!(plugin_at < threads_at);
}

#[test]
fn test_redis_logger_pulls_plugin() {
    let mut section = Section::default();
    section
        .logging()
        .add_logger(&loggers::redis(None, None, None, None), false, false);

    assert_eq!(options(&section)[0], pair("plugin", "redislog"));
}

#[test]
fn test_placeholder_expansion() {
    let mut section = Section::default();
    section.env("FOO", "bar", false).set("chdir", "/srv/{FOO}");

    assert!(options(&section).contains(&pair("chdir", "/srv/bar")));
}

#[test]
fn test_unknown_placeholder_strict() {
    let mut section = Section::default();
    section
        .set_basic_params(SectionParams {
            strict_config: Some(true),
        })
        .set("chdir", "/srv/{BAZ}");

    let err = section.options().unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::UnresolvedPlaceholder { ref token, .. } if token == "BAZ"
    ));
}

#[test]
fn test_unknown_placeholder_lenient() {
    let mut section = Section::default();
    section.set("chdir", "/srv/{BAZ}");

    assert_eq!(options(&section), vec![pair("chdir", "/srv/{BAZ}")]);
}

#[test]
fn test_https_from_dsn() {
    let socket = sockets::from_dsn("https://127.0.0.1:443?cert=/c&key=/k", Some(false)).unwrap();
    let mut section = Section::default();
    section.networking().register_socket(socket);

    assert_eq!(
        options(&section),
        vec![pair("https-socket", "127.0.0.1:443,/c,/k")]
    );
}

#[test]
fn test_dsn_rejects_unknown_param() {
    let err = sockets::from_dsn("http://:80?bogus=1", None).unwrap_err();
    assert!(matches!(err, ConfigurationError::UnknownDsnParam { .. }));
}

// ============================================================================
// Configurations
// ============================================================================

#[test]
fn test_configuration_autoinclude() {
    let mut main = Section::new("main");
    main.set("master", true);
    let mut extra = Section::new("extra");
    extra.workers().set_count_auto(Some(2));

    let text = Configuration::new(vec![main, extra])
        .with_autoinclude(true)
        .format_ini(false)
        .unwrap();

    assert_eq!(
        text,
        "\n[main]\nmaster = true\nini = :extra\n\n[extra]\nworkers = 2\n"
    );
}

#[test]
fn test_configuration_args_skip_config_variables() {
    let mut section = Section::default();
    section
        .master_process()
        .set_basic_params(MasterParams {
            enable: Some(true),
            ..MasterParams::default()
        })
        .workers()
        .set_count_auto(None)
        .networking()
        .register_socket(sockets::http(":8000"));

    let args = section.as_configuration().format_args().unwrap();
    assert_eq!(args, vec!["--master", "--http-socket", ":8000"]);
}

#[test]
fn test_render_with_settings() {
    let settings = RenderSettings::from_toml_str(
        r#"
        formatter = "args"
        default_section = "app"
        "#,
    )
    .unwrap();
    let mut section = Section::new("app");
    section.set("workers", 2u32);

    let rendered = section.as_configuration().render(&settings).unwrap();
    assert!(matches!(rendered, Rendered::Args(ref args) if args == &["--workers", "2"]));
}

#[test]
fn test_to_file_in_directory() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let mut section = Section::new("site");
    section.set("master", true);

    let path = section.as_configuration().to_file(dir.path()).unwrap();
    assert_eq!(path, dir.path().join("site.ini"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("; Generated by uwsgiconf"));
    assert!(text.ends_with("[site]\nmaster = true\n"));
}

#[test]
fn test_duplicate_section_names_rejected() {
    let config = Configuration::new(vec![Section::new("uwsgi"), Section::new("uwsgi")]);
    assert!(matches!(
        config.format_ini(false),
        Err(ConfigurationError::DuplicateSection { .. })
    ));
}
