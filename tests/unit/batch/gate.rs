use super::*;

fn summary() -> PendingSummary {
    PendingSummary::new(vec!["Dark Magician".into(), "Kuriboh".into()], 3)
}

#[test]
fn affirmative_answers() {
    for a in ["y", "Y", "yes", " YES \n", "y\r\n"] {
        assert!(is_affirmative(a), "{a:?}");
    }
    for a in ["", "n", "no", "yep", "sure", "1", "y y"] {
        assert!(!is_affirmative(a), "{a:?}");
    }
}

#[test]
fn prompt_lists_pending_items_and_accepts_yes() {
    let mut out = Vec::new();
    let mut gate = PromptGate::new(&b"yes\n"[..], &mut out);
    assert!(gate.confirm(&summary()).unwrap());

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("2 item(s) to produce, 3 already present"));
    assert!(text.contains("  - Dark Magician\n"));
    assert!(text.ends_with("Proceed? (y/n) "));
}

#[test]
fn prompt_treats_other_input_and_eof_as_refusal() {
    let mut gate = PromptGate::new(&b"maybe\n"[..], Vec::new());
    assert!(!gate.confirm(&summary()).unwrap());

    let mut gate = PromptGate::new(&b""[..], Vec::new());
    assert!(!gate.confirm(&summary()).unwrap());
}

#[test]
fn closures_and_auto_confirm_are_gates() {
    let mut calls = 0;
    let mut gate = |s: &PendingSummary| {
        calls += 1;
        s.pending() == 2
    };
    assert!(gate.confirm(&summary()).unwrap());
    assert_eq!(calls, 1);
    assert!(AutoConfirm.confirm(&summary()).unwrap());
}
