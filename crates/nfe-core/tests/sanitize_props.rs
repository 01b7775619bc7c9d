use nfe_core::sanitize;
use proptest::prelude::*;

proptest! {
    #[test]
    fn sanitize_is_idempotent(raw in "\\PC{0,40}") {
        let once = sanitize(&raw);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn sanitized_values_use_the_allowed_alphabet(raw in "[ -~áéíóúãõçÁÉÍÓÚÃÕÇ&\t]{0,40}") {
        let clean = sanitize(&raw);
        prop_assert!(
            clean
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || " @,-.;:/_".contains(ch))
        );
        prop_assert_eq!(clean.trim(), clean.as_str());
    }
}
