/// Sanitises author-supplied display text (quiz titles, question and option text)
/// before it is stored and later rendered to learners.
///
/// Whitelist based: harmless markup such as <b> or <p> survives, <script> and
/// event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
