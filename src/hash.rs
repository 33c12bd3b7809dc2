/// Hex-encoded MD5 digest over the canonical string form of an ordered
/// field tuple. Serves as the natural key for leagues and matches and as
/// the foreign key carried to dependent records.
///
/// Order- and value-sensitive; empty fields still hash, so duplicate
/// detection degrades instead of failing.
pub fn digest(fields: &[&str]) -> String {
    let canonical = format!(
        "[{}]",
        fields
            .iter()
            .map(|f| format!("{:?}", f))
            .collect::<Vec<_>>()
            .join(", ")
    );
    format!("{:x}", md5::compute(canonical.as_bytes()))
}
