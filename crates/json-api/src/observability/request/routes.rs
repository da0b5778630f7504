//! Route templates for span and metric labels.

/// Replace identifier segments with their route parameter names.
pub(super) fn route_template(path: &str) -> String {
    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    let mut template = String::new();

    let mut previous: Option<&str> = None;

    for segment in segments {
        template.push('/');

        match (previous, segment) {
            (Some("promos"), "search" | "usage") => template.push_str(segment),
            (Some("promos"), _) => template.push_str("{promo_id}"),
            (Some("customers"), _) => template.push_str("{customer_id}"),
            (Some("orders"), _) => template.push_str("{order_id}"),
            _ => template.push_str(segment),
        }

        previous = Some(segment);
    }

    if template.is_empty() {
        template.push('/');
    }

    template
}
