use validator::ValidationErrors;

/// Flattens `validator` errors into one `;`-separated message.
///
/// Validators without a custom message fall back to `field: code`.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(m) => m.to_string(),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "title is required"))]
        title: String,
        #[validate(range(min = 1))]
        points: i32,
    }

    #[test]
    fn custom_and_default_messages_are_joined() {
        let err = Payload {
            title: String::new(),
            points: 0,
        }
        .validate()
        .unwrap_err();

        assert_eq!(format_validation_errors(&err), "points: range; title is required");
    }
}
