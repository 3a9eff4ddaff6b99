//! Property tests for render determinism and multi-valued options.

use proptest::prelude::*;
use uwsgiconf::prelude::*;

/// A setter call recorded as data so it can be replayed on any section.
#[derive(Debug, Clone)]
enum Call {
    Workers(u32),
    Import(String),
    Env(String, String),
    Socket(u16),
    Print(String),
}

impl Call {
    fn apply(&self, section: &mut Section) {
        match self {
            Self::Workers(count) => {
                section.workers().set_count_auto(Some(*count));
            }
            Self::Import(module) => {
                section.python().import_module(module, false);
            }
            Self::Env(name, value) => {
                section.env(name, value, false);
            }
            Self::Socket(port) => {
                section
                    .networking()
                    .register_socket(sockets::http(format!(":{port}")));
            }
            Self::Print(text) => {
                section.print_out(text.as_str());
            }
        }
    }
}

fn call_strategy() -> impl Strategy<Value = Call> {
    prop_oneof![
        (1u32..64).prop_map(Call::Workers),
        "[a-z]{1,8}".prop_map(Call::Import),
        ("[A-Z]{1,6}", "[a-z0-9]{0,6}").prop_map(|(n, v)| Call::Env(n, v)),
        (1024u16..u16::MAX).prop_map(Call::Socket),
        "[a-z ]{1,12}".prop_map(Call::Print),
    ]
}

fn render(calls: &[Call]) -> String {
    let mut section = Section::default();
    for call in calls {
        call.apply(&mut section);
    }
    section.as_configuration().format_ini(false).unwrap()
}

proptest! {
    #[test]
    fn test_same_calls_render_same_bytes(calls in prop::collection::vec(call_strategy(), 0..32)) {
        prop_assert_eq!(render(&calls), render(&calls.clone()));
    }

    #[test]
    fn test_multi_setter_appends_in_call_order(modules in prop::collection::vec("[a-z]{1,8}", 1..16)) {
        let mut section = Section::default();
        for module in &modules {
            section.python().import_module(module, false);
        }

        let rendered: Vec<String> = section
            .options()
            .unwrap()
            .into_iter()
            .filter(|(key, _)| key == "pyimport")
            .map(|(_, value)| value)
            .collect();
        prop_assert_eq!(rendered, modules);
    }

    #[test]
    fn test_single_setter_keeps_last_value(counts in prop::collection::vec(1u32..1024, 1..16)) {
        let mut section = Section::default();
        for count in &counts {
            section.workers().set_count_auto(Some(*count));
        }

        let workers: Vec<(String, String)> = section
            .options()
            .unwrap()
            .into_iter()
            .filter(|(key, _)| key == "workers")
            .collect();
        let last = counts[counts.len() - 1].to_string();
        prop_assert_eq!(workers, vec![("workers".to_string(), last)]);
    }
}
