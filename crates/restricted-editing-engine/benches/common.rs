// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_form_markup(paragraphs: usize) -> String {
    let mut markup = String::new();
    for i in 0..paragraphs {
        markup.push_str(&format!(
            "<p>Field {i}: <span class=\"exception-marker\">value {i}</span> and some fixed &amp; locked text.</p>\n"
        ));
    }
    markup
}

#[allow(dead_code)]
pub fn generate_plain_markup(paragraphs: usize) -> String {
    "<p>Some paragraph content with <b>inline</b> formatting.</p>\n".repeat(paragraphs)
}
