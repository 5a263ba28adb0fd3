/// Pads the first column so the second one lines up.
pub fn align_columns<L, R>(rows: &[(L, R)]) -> Vec<String>
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    let width = rows
        .iter()
        .map(|(left, _)| left.as_ref().chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|(left, right)| {
            let (left, right) = (left.as_ref(), right.as_ref());
            if right.is_empty() {
                left.to_string()
            } else {
                format!("{left:<width$}  {right}")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_second_column() {
        let lines = align_columns(&[("help", "Displays help"), ("ls", "Lists files"), ("x", "")]);
        assert_eq!(lines, vec!["help  Displays help", "ls    Lists files", "x"]);
    }

    #[test]
    fn empty_input() {
        assert!(align_columns::<&str, &str>(&[]).is_empty());
    }
}
