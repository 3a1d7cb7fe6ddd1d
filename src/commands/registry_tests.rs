use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn registry_with(commands: Vec<Command>) -> CommandRegistry {
    let registry = CommandRegistry::new("/nonexistent/commands.json");
    for cmd in commands {
        registry.upsert(cmd);
    }
    registry
}

// ========================================
// Action parsing
// ========================================

#[test]
fn parse_action_splits_on_first_colon() {
    assert_eq!(parse_action("vault.insert"), Some(("vault.insert", None)));
    assert_eq!(
        parse_action("vault.insert:openai_main"),
        Some(("vault.insert", Some("openai_main")))
    );
    assert_eq!(
        parse_action("text.type:a:b"),
        Some(("text.type", Some("a:b")))
    );
    assert_eq!(parse_action("text.type:"), Some(("text.type", Some(""))));
    assert_eq!(parse_action(""), None);
}

// ========================================
// Loading / saving
// ========================================

#[test]
fn load_creates_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config").join("commands.json");
    let registry = CommandRegistry::new(&path);

    assert_eq!(registry.load().unwrap(), 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}

#[test]
fn load_treats_empty_file_as_empty_list() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("commands.json");
    std::fs::write(&path, "   \n").unwrap();

    let registry = CommandRegistry::new(&path);
    assert_eq!(registry.load().unwrap(), 0);
    assert!(registry.is_empty());
}

#[test]
fn load_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("commands.json");
    std::fs::write(
        &path,
        r#"[
            {"id": "sig", "action": "text.type:Best regards", "hotstring": "BTW"},
            {"id": "speak", "label": "Speak selection", "action": "tts.speak", "hotkey": "ctrl+alt+s", "tags": ["tts"]}
        ]"#,
    )
    .unwrap();

    let registry = CommandRegistry::new(&path);
    assert_eq!(registry.load().unwrap(), 2);

    let sig = registry.get("sig").unwrap();
    assert_eq!(sig.label, "sig");
    assert_eq!(sig.hotkey, "");
    assert_eq!(sig.hotstring, "BTW");
    assert!(sig.tags.is_empty());

    let speak = registry.get("speak").unwrap();
    assert_eq!(speak.label, "Speak selection");
    assert_eq!(speak.tags, vec!["tts".to_string()]);
}

#[test]
fn load_keeps_later_duplicate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("commands.json");
    std::fs::write(
        &path,
        r#"[
            {"id": "a", "action": "first"},
            {"id": "b", "action": "other"},
            {"id": "a", "action": "second"}
        ]"#,
    )
    .unwrap();

    let registry = CommandRegistry::new(&path);
    assert_eq!(registry.load().unwrap(), 2);
    assert_eq!(registry.get("a").unwrap().action, "second");
    // Position of the first occurrence is kept
    assert_eq!(registry.all()[0].id, "a");
}

#[test]
fn load_rejects_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("commands.json");
    std::fs::write(&path, "[{").unwrap();

    let registry = CommandRegistry::new(&path);
    assert!(matches!(registry.load(), Err(crate::error::StratumError::Json { .. })));
}

#[test]
fn save_then_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("commands.json");
    let registry = CommandRegistry::new(&path);
    registry.load().unwrap();

    let id = registry.add_command("Email Sig", "text.type:Cheers", "", "SIG", vec![]);
    registry.save().unwrap();

    let reloaded = CommandRegistry::new(&path);
    assert_eq!(reloaded.load().unwrap(), 1);
    let cmd = reloaded.get(&id).unwrap();
    assert_eq!(cmd.label, "Email Sig");
    assert_eq!(cmd.hotstring, "SIG");
}

// ========================================
// Editing
// ========================================

#[test]
fn add_command_derives_unique_ids() {
    let registry = registry_with(vec![]);
    let first = registry.add_command("My Note", "a", "", "", vec![]);
    let second = registry.add_command("My Note", "b", "", "", vec![]);
    let third = registry.add_command("my note", "c", "", "", vec![]);

    assert_eq!(first, "my_note");
    assert_eq!(second, "my_note_1");
    assert_eq!(third, "my_note_2");
    assert_eq!(registry.len(), 3);
}

#[test]
fn update_command_changes_only_given_fields() {
    let registry = registry_with(vec![Command::new("sig", "text.type:hi").with_hotstring("BTW")]);

    let updated = registry.update_command(
        "sig",
        CommandUpdate {
            hotstring: Some("SIG".to_string()),
            ..Default::default()
        },
    );
    assert!(updated);

    let cmd = registry.get("sig").unwrap();
    assert_eq!(cmd.hotstring, "SIG");
    assert_eq!(cmd.action, "text.type:hi");

    assert!(!registry.update_command("missing", CommandUpdate::default()));
}

#[test]
fn remove_command_reports_presence() {
    let registry = registry_with(vec![Command::new("a", "x"), Command::new("b", "y")]);
    assert!(registry.remove_command("a"));
    assert!(!registry.remove_command("a"));
    assert_eq!(registry.len(), 1);
    assert!(registry.get("b").is_some());
}

// ========================================
// Execution
// ========================================

#[test]
fn execute_calls_no_arg_handler() {
    let registry = registry_with(vec![Command::new("speak", "tts.speak")]);
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    registry.register_fn("tts.speak", move || {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });

    registry.execute("speak");
    registry.execute("speak");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn execute_passes_suffix_argument() {
    let registry = registry_with(vec![Command::new("key", "vault.insert:openai_main")]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    registry.register_fn_with_arg("vault.insert", move |arg| {
        seen_clone.lock().unwrap().push(arg.to_string());
    });

    registry.execute("key");
    assert_eq!(*seen.lock().unwrap(), vec!["openai_main".to_string()]);
}

#[test]
fn execute_is_silent_for_unknown_or_unbound() {
    let registry = registry_with(vec![
        Command::new("empty", ""),
        Command::new("unbound", "nobody.home"),
    ]);
    registry.execute("missing");
    registry.execute("empty");
    registry.execute("unbound");
}

#[test]
fn execute_skips_arity_mismatch() {
    let registry = registry_with(vec![
        Command::new("extra_arg", "plain:unexpected"),
        Command::new("missing_arg", "needs_arg"),
    ]);
    let calls = Arc::new(AtomicUsize::new(0));
    let c1 = Arc::clone(&calls);
    let c2 = Arc::clone(&calls);
    registry.register_fn("plain", move || {
        c1.fetch_add(1, Ordering::SeqCst);
    });
    registry.register_fn_with_arg("needs_arg", move |_| {
        c2.fetch_add(1, Ordering::SeqCst);
    });

    registry.execute("extra_arg");
    registry.execute("missing_arg");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn execute_contains_handler_panic() {
    let registry = registry_with(vec![Command::new("boom", "explode")]);
    registry.register_fn("explode", || panic!("handler failure"));

    registry.execute("boom");

    // Registry is still usable afterwards
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    registry.register_fn("explode", move || {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });
    registry.execute("boom");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn handler_may_reenter_registry() {
    let registry = Arc::new(registry_with(vec![
        Command::new("outer", "call_inner"),
        Command::new("inner", "count"),
    ]));
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    registry.register_fn("count", move || {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });
    let weak = Arc::downgrade(&registry);
    registry.register_fn("call_inner", move || {
        if let Some(registry) = weak.upgrade() {
            registry.execute("inner");
        }
    });

    registry.execute("outer");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
