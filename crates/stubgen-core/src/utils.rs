//! String transformation utilities for code generation

/// Convert a string to PascalCase.
///
/// Underscores are dropped and the following character is uppercased.
/// Interior capitals are preserved, so `userId` becomes `UserId` rather
/// than `Userid`.
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut force_upper = true;

    for ch in s.chars() {
        if ch == '_' {
            force_upper = true;
        } else if force_upper {
            result.extend(ch.to_uppercase());
            force_upper = false;
        } else {
            result.push(ch);
        }
    }

    result
}

/// Convert a string to camelCase (PascalCase with the first character lowered)
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("user_id"), "UserId");
        assert_eq!(to_pascal_case("userId"), "UserId");
        assert_eq!(to_pascal_case("get_user"), "GetUser");
        assert_eq!(to_pascal_case("GetUser"), "GetUser");
        assert_eq!(to_pascal_case("include_deleted"), "IncludeDeleted");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("user_id"), "userId");
        assert_eq!(to_camel_case("UserID"), "userID");
        assert_eq!(to_camel_case("include_deleted"), "includeDeleted");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_case_conversion_collision() {
        // `user_id` and `userId` are distinct source names that converge
        // after Pascal conversion; the engine turns this into an
        // IdentifierCollision error.
        assert_eq!(to_pascal_case("user_id"), to_pascal_case("userId"));
        assert_eq!(to_camel_case("user_id"), to_camel_case("userId"));
    }
}
