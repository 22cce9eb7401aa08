use sciqa_core::domain::Letter;

pub fn answer_prompt(question: &str, choices: &[String; 5], context: &str) -> String {
    let choice_lines = Letter::ALL
        .iter()
        .map(|l| format!("Choice {l}) {}", choices[l.index()]))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"Use the context below to answer a multiple-choice question. Work through it step by step.

Context: {context}

Question: {question}

Choices:
{choice_lines}

How to work:
- Read the question and decide what it is really asking before looking at the choices.
- Relate the question to the concepts described in the context.
- Check each choice against the context, one by one, and say whether it is correct,
  partially correct or wrong.
- Then commit to one choice.

You may reason freely, but the LAST line of your reply must be exactly
'Answer: ' followed by one of A, B, C, D or E.
"#
    )
}
