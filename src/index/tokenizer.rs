/// Splits text into lowercase alphanumeric tokens
///
/// Any run of non-alphanumeric characters is a separator. Stemming and
/// stop-word handling belong to the downstream index service.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
