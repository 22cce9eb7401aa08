use sciqa_core::choice::{extract_choice, parse_choice, resolve_choice, ParsedChoice};
use sciqa_core::domain::Letter;
use sciqa_core::eval::accuracy;

#[test]
fn answer_line_at_the_end_is_parsed() {
    let resp = "Choice A is wrong because...\nChoice C matches the context.\nAnswer: C";
    assert_eq!(parse_choice(resp), ParsedChoice::Answered { letter: Letter::C });
    let r = extract_choice(resp);
    assert_eq!(r.letter, Letter::C);
    assert!(!r.defaulted);
}

#[test]
fn trailing_blank_lines_and_extra_text_are_tolerated() {
    assert_eq!(
        parse_choice("reasoning\n  Answer:   D) Mitochondria  \n\n   \n"),
        ParsedChoice::Answered { letter: Letter::D }
    );
}

#[test]
fn free_text_falls_back_to_default() {
    let resp = "I think the answer is clear";
    assert_eq!(
        parse_choice(resp),
        ParsedChoice::Malformed {
            raw: resp.to_string()
        }
    );
    let r = extract_choice(resp);
    assert_eq!(r.letter, Letter::A);
    assert!(r.defaulted);
}

#[test]
fn unrecognized_letter_falls_back_to_default() {
    let parsed = parse_choice("Answer: Z");
    assert!(matches!(parsed, ParsedChoice::Malformed { .. }));
    let r = resolve_choice(&parsed);
    assert_eq!(r.letter, Letter::A);
    assert!(r.defaulted);
}

#[test]
fn answer_line_not_last_is_malformed() {
    assert!(matches!(
        parse_choice("Answer: B\nbut on reflection I am unsure"),
        ParsedChoice::Malformed { .. }
    ));
    assert!(matches!(parse_choice(""), ParsedChoice::Malformed { .. }));
    assert!(matches!(parse_choice("Answer:"), ParsedChoice::Malformed { .. }));
    assert!(matches!(parse_choice("answer: B"), ParsedChoice::Malformed { .. }));
}

#[test]
fn defaults_are_countable_across_a_batch() {
    let responses = ["Answer: B", "no idea", "Answer: E", "Answer: q"];
    let resolved = responses.iter().map(|r| extract_choice(r)).collect::<Vec<_>>();
    assert_eq!(resolved.iter().filter(|r| r.defaulted).count(), 2);
    assert_eq!(
        resolved.iter().map(|r| r.letter).collect::<Vec<_>>(),
        vec![Letter::B, Letter::A, Letter::E, Letter::A]
    );
}

#[test]
fn accuracy_counts_equal_positions() {
    use Letter::*;
    let acc = accuracy(&[A, B, C], &[A, B, D]).expect("accuracy");
    assert!((acc - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(accuracy(&[E], &[E]).expect("accuracy"), 1.0);
}

#[test]
fn accuracy_rejects_more_predictions_than_truth() {
    use Letter::*;
    let err = accuracy(&[A, B, C, D], &[A, B]).unwrap_err();
    assert_eq!(err.code, "EVAL_LENGTH_MISMATCH");
}

#[test]
fn accuracy_compares_prefix_when_predictions_are_shorter() {
    use Letter::*;
    let acc = accuracy(&[A, C], &[A, B, C, D]).expect("accuracy");
    assert_eq!(acc, 0.5);
}

#[test]
fn accuracy_rejects_empty_predictions() {
    let err = accuracy(&[], &[Letter::A]).unwrap_err();
    assert_eq!(err.code, "EVAL_EMPTY_PREDICTIONS");
}
