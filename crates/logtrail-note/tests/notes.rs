use logtrail_note::{open_note, sign_note, NoteError, NoteSigner, Signer, Verifier};

fn signer(name: &str, seed: u8) -> NoteSigner {
    NoteSigner::new(name, &[seed; 32]).unwrap()
}

const TEXT: &str = "Hello World Log\n11\nAQID\n";

#[test]
fn signed_note_opens_with_matching_verifier() {
    let s = signer("example.com/log", 1);
    let signed = sign_note(TEXT, &[&s]).unwrap();
    let note = open_note(&signed, &[&s.verifier()]).unwrap();

    assert_eq!(note.text, TEXT);
    assert_eq!(note.sigs.len(), 1);
    assert_eq!(note.sigs[0].name, "example.com/log");
    assert_eq!(note.sigs[0].key_hash, s.key_hash());
    assert!(note.unverified_sigs.is_empty());
}

#[test]
fn signed_note_layout_is_text_blank_line_signatures() {
    let s = signer("log", 2);
    let signed = String::from_utf8(sign_note(TEXT, &[&s]).unwrap()).unwrap();
    let (text, sigs) = signed.split_once("\n\n").unwrap();
    assert_eq!(format!("{}\n", text), TEXT);
    assert!(sigs.starts_with("\u{2014} log "));
    assert!(sigs.ends_with('\n'));
    assert_eq!(sigs.lines().count(), 1);
}

#[test]
fn countersigned_note_keeps_unknown_signatures_unverified() {
    let log = signer("log", 3);
    let witness = signer("witness", 4);
    let signed = sign_note(TEXT, &[&log, &witness]).unwrap();

    let note = open_note(&signed, &[&log.verifier()]).unwrap();
    assert_eq!(note.sigs.len(), 1);
    assert_eq!(note.unverified_sigs.len(), 1);
    assert_eq!(note.unverified_sigs[0].name, "witness");

    let both = open_note(&signed, &[&log.verifier(), &witness.verifier()]).unwrap();
    assert_eq!(both.sigs.len(), 2);
}

#[test]
fn tampered_text_fails_verification() {
    let s = signer("log", 5);
    let signed = sign_note(TEXT, &[&s]).unwrap();
    let tampered = String::from_utf8(signed).unwrap().replacen("11", "12", 1);
    let err = open_note(tampered.as_bytes(), &[&s.verifier()]).unwrap_err();
    assert!(matches!(err, NoteError::InvalidSignature { .. }));
}

#[test]
fn note_without_known_signer_is_unverified() {
    let s = signer("log", 6);
    let other = signer("other", 7);
    let signed = sign_note(TEXT, &[&s]).unwrap();
    let err = open_note(&signed, &[&other.verifier()]).unwrap_err();
    assert!(matches!(err, NoteError::Unverified));
}

#[test]
fn verifier_with_same_name_but_other_key_does_not_match() {
    let s = signer("log", 8);
    let impostor = signer("log", 9);
    let signed = sign_note(TEXT, &[&s]).unwrap();
    let impostor = impostor.verifier();
    let verifiers: Vec<&dyn Verifier> = vec![&impostor];
    assert!(matches!(
        open_note(&signed, &verifiers),
        Err(NoteError::Unverified)
    ));
}

#[test]
fn sign_requires_trailing_newline() {
    let s = signer("log", 10);
    assert!(matches!(
        sign_note("no newline", &[&s]),
        Err(NoteError::Malformed(_))
    ));
}

#[test]
fn open_rejects_missing_signature_block() {
    let s = signer("log", 11);
    assert!(matches!(
        open_note(TEXT.as_bytes(), &[&s.verifier()]),
        Err(NoteError::Malformed(_))
    ));
}

#[test]
fn repeated_signature_lines_are_dropped() {
    let s = signer("log", 12);
    let signed = String::from_utf8(sign_note(TEXT, &[&s]).unwrap()).unwrap();
    let sig_line = signed.split_once("\n\n").unwrap().1.to_string();
    let doubled = format!("{}{}", signed, sig_line);
    let note = open_note(doubled.as_bytes(), &[&s.verifier()]).unwrap();
    assert_eq!(note.sigs.len(), 1);
}
