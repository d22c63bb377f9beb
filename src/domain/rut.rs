//! Chilean national ID (RUT) handling: normalization, check-digit
//! validation and display formatting. Pure functions, shared by customer
//! forms, duplicate detection and the store-merge path.

/// Strip dots, hyphens and whitespace and uppercase the check character.
///
/// `12.345.678-5` and `12345678-5` both normalize to `123456785`. The
/// result is what gets persisted and compared.
pub fn normalize(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '.' | '-') && !ch.is_whitespace())
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

/// Whether `input` is a structurally valid RUT with a correct modulo-11
/// check digit. Accepts formatted or bare input.
pub fn is_valid(input: &str) -> bool {
    let normalized = normalize(input);
    if normalized.len() < 2 {
        return false;
    }

    let (body, check) = normalized.split_at(normalized.len() - 1);
    if body.is_empty() || !body.chars().all(|ch| ch.is_ascii_digit()) {
        return false;
    }

    let Some(expected) = check_digit(body) else {
        return false;
    };

    check == expected.to_string()
}

/// Compute the modulo-11 check character for a digit-only RUT body:
/// `0`-`9` or `K`.
pub fn check_digit(body: &str) -> Option<char> {
    if body.is_empty() || !body.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }

    let mut factor = 2u32;
    let mut sum = 0u32;
    for ch in body.chars().rev() {
        let digit = ch.to_digit(10)?;
        sum += digit * factor;
        factor = if factor == 7 { 2 } else { factor + 1 };
    }

    Some(match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        digit => char::from_digit(digit, 10)?,
    })
}

/// Render a normalized RUT with dot-grouped digits and a hyphenated
/// check character: `123456785` becomes `12.345.678-5`. Input that is
/// too short to split is returned unchanged.
pub fn format(input: &str) -> String {
    let normalized = normalize(input);
    if normalized.len() < 2 {
        return normalized;
    }

    let (body, check) = normalized.split_at(normalized.len() - 1);

    let digits: Vec<char> = body.chars().collect();
    let mut grouped = String::with_capacity(body.len() + body.len() / 3 + 2);
    for (position, ch) in digits.iter().enumerate() {
        let remaining = digits.len() - position;
        grouped.push(*ch);
        if remaining > 1 && (remaining - 1) % 3 == 0 {
            grouped.push('.');
        }
    }

    format!("{grouped}-{check}")
}
