//! Character normalization applied to every bound field value.
//!
//! The TXT format travels through ERPs with inconsistent encodings, so values
//! are reduced to the ASCII subset accepted by the NF-e schema: accented
//! letters are transliterated, `&` becomes `e`, and anything outside letters,
//! digits, space and `@,-.;:/_` is dropped.

/// Normalize one raw field value.
///
/// Pure and idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match transliterate(ch) {
            Some(ascii) => out.push(ascii),
            None if is_allowed(ch) => out.push(ch),
            None => {}
        }
    }
    out.trim().to_string()
}

fn is_allowed(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '@' | ',' | '-' | '.' | ';' | ':' | '/' | '_')
}

fn transliterate(ch: char) -> Option<char> {
    let ascii = match ch {
        '&' => 'e',
        'á' | 'à' | 'ã' | 'â' | 'ä' | 'å' | 'ª' => 'a',
        'Á' | 'À' | 'Ã' | 'Â' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'õ' | 'ô' | 'ö' | 'º' => 'o',
        'Ó' | 'Ò' | 'Õ' | 'Ô' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        _ => return None,
    };
    Some(ascii)
}
