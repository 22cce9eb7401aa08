pub fn keyword_prompt(question: &str, choices: Option<&[String; 5]>) -> String {
    let choices_block = match choices {
        Some(c) => format!(
            "\nPossible answers:\nA) {}\nB) {}\nC) {}\nD) {}\nE) {}\n",
            c[0], c[1], c[2], c[3], c[4]
        ),
        None => String::new(),
    };
    format!(
        r#"You are preparing to answer a multiple-choice question about a scientific topic.
I can look up encyclopedia articles for you, but you must tell me what to search for.

Question: {question}
{choices_block}
Reply with the single most relevant search keyword (at most three, comma separated).
Each keyword must read like the title of an encyclopedia article: a person, a law, a
physical phenomenon, a compound, an organism.
Good: Newton, Gravity, Black hole
Bad: Number of stars in the universe, What is gravity

Do not explain. Output only the keyword(s).
"#
    )
}
