//! String helpers for file names, routes and namespaces

pub fn pluralize_word(word: &str) -> String {
    if word.ends_with('y')
        && word.len() > 1
        && !word[..word.len() - 1].ends_with(['a', 'e', 'i', 'o', 'u'])
    {
        format!("{}ies", &word[..word.len() - 1])
    } else if word.ends_with('s') || word.ends_with("sh") || word.ends_with("ch") || word.ends_with('x') {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}

pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev != '_' && (prev.is_lowercase() || prev.is_ascii_digit() || next_is_lower) {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }
    result
}

/// Route prefix without surrounding slashes
pub fn normalize_route_prefix(route_prefix: &str) -> String {
    route_prefix.trim().trim_matches('/').to_string()
}

/// Route name prefix: slashes in the route prefix become underscores
pub fn route_name_prefix(route_prefix: &str) -> String {
    normalize_route_prefix(route_prefix).replace('/', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize_word() {
        assert_eq!(pluralize_word("order"), "orders");
        assert_eq!(pluralize_word("category"), "categories");
        assert_eq!(pluralize_word("day"), "days");
        assert_eq!(pluralize_word("box"), "boxes");
        assert_eq!(pluralize_word("address"), "addresses");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("OrderLine"), "order_line");
        assert_eq!(to_snake_case("Order"), "order");
        assert_eq!(to_snake_case("APIKey"), "api_key");
        assert_eq!(to_snake_case("Address2Line"), "address2_line");
    }

    #[test]
    fn test_route_name_prefix() {
        assert_eq!(route_name_prefix("/admin/orders/"), "admin_orders");
        assert_eq!(route_name_prefix("orders"), "orders");
        assert_eq!(route_name_prefix(""), "");
        assert_eq!(normalize_route_prefix(" /admin/orders "), "admin/orders");
    }
}
