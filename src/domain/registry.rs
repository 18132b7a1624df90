//! Field schemas for each content domain
//!
//! Pure data: every domain maps to an ordered field list built against the
//! live document, so list-item counts are re-derived on every call. Adding or
//! removing a list item goes through the dedicated list actions, after which
//! the schema regenerates with the new count.

use serde_json::{json, Value};

use super::field::{
    repeat_fields, FieldConfig, FieldType, GallerySpec, TableColumn, TableSort, TableSpec,
};
use super::path::FieldPath;

/// An editable variable-length list within a domain, with the template a
/// freshly added item starts from
#[derive(Debug, Clone)]
pub struct ListConfig {
    pub path: FieldPath,
    pub label: String,
    pub template: Value,
}

/// Slugs with a registered schema, in site order
pub const DOMAIN_SLUGS: [&str; 6] = [
    "home",
    "about",
    "packages",
    "testimonials",
    "results",
    "misc",
];

/// The current field list for a domain, or `None` for an unknown slug
pub fn fields_for(slug: &str, document: &Value) -> Option<Vec<FieldConfig>> {
    match slug {
        "home" => Some(home_fields()),
        "about" => Some(about_fields(document)),
        "packages" => Some(packages_fields(document)),
        "testimonials" => Some(testimonials_fields(document)),
        "results" => Some(results_fields(document)),
        "misc" => Some(misc_fields(document)),
        _ => None,
    }
}

/// The editable lists of a domain (empty for domains without any)
pub fn lists_for(slug: &str) -> Vec<ListConfig> {
    match slug {
        "about" => vec![ListConfig {
            path: FieldPath::root().key("tutors"),
            label: "Tutor".into(),
            template: json!({ "name": "", "subject": "", "bio": "", "photoSrc": "" }),
        }],
        "packages" => vec![ListConfig {
            path: FieldPath::root().key("items"),
            label: "Package".into(),
            template: json!({ "name": "", "price": "", "description": "", "features": [] }),
        }],
        "testimonials" => vec![ListConfig {
            path: FieldPath::root().key("featured"),
            label: "Testimonial".into(),
            template: json!({ "name": "", "role": "", "quote": "", "avatarSrc": "" }),
        }],
        "results" => vec![ListConfig {
            path: FieldPath::root().key("groups"),
            label: "Result group".into(),
            template: json!({ "label": "", "scores": [] }),
        }],
        "misc" => vec![ListConfig {
            path: FieldPath::root().key("faq"),
            label: "FAQ item".into(),
            template: json!({ "question": "", "answer": "" }),
        }],
        _ => Vec::new(),
    }
}

fn list_len(document: &Value, path: &FieldPath) -> usize {
    path.get(document)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

fn home_fields() -> Vec<FieldConfig> {
    let leaflet = FieldPath::root().key("leaflet");
    vec![
        FieldConfig::new(
            FieldPath::root().key("hero").key("title"),
            "Hero title",
            FieldType::Text,
        ),
        FieldConfig::new(
            FieldPath::root().key("hero").key("subtitle"),
            "Hero subtitle",
            FieldType::Textarea,
        ),
        FieldConfig::new(
            FieldPath::root().key("hero").key("ctaLabel"),
            "Hero button label",
            FieldType::Text,
        ),
        FieldConfig::new(
            FieldPath::root().key("intro").key("heading"),
            "Intro heading",
            FieldType::Text,
        ),
        FieldConfig::new(
            FieldPath::root().key("intro").key("body"),
            "Intro body",
            FieldType::Textarea,
        ),
        FieldConfig::new(
            FieldPath::root().key("highlights"),
            "Highlights",
            FieldType::StringList,
        )
        .with_description("One highlight per line"),
        FieldConfig::new(
            leaflet.clone().key("pagesDir"),
            "Leaflet directory",
            FieldType::Text,
        )
        .with_description("Public directory the leaflet pages are published under"),
        FieldConfig::new(
            leaflet.clone().key("pagesFormat"),
            "Leaflet page filename prefix",
            FieldType::Text,
        ),
        FieldConfig::new(
            leaflet.clone().key("pages"),
            "Leaflet pages",
            FieldType::Gallery(GallerySpec {
                dir_path: leaflet.clone().key("pagesDir"),
                format_path: leaflet.key("pagesFormat"),
            }),
        )
        .with_description("PNG pages, in reading order"),
    ]
}

fn about_fields(document: &Value) -> Vec<FieldConfig> {
    let tutors = FieldPath::root().key("tutors");
    let mut fields = vec![
        FieldConfig::new(
            FieldPath::root().key("hero").key("title"),
            "Hero title",
            FieldType::Text,
        ),
        FieldConfig::new(
            FieldPath::root().key("hero").key("subtitle"),
            "Hero subtitle",
            FieldType::Textarea,
        ),
        FieldConfig::new(
            FieldPath::root().key("story").key("heading"),
            "Story heading",
            FieldType::Text,
        ),
        FieldConfig::new(
            FieldPath::root().key("story").key("body"),
            "Story body",
            FieldType::Textarea,
        ),
    ];
    fields.extend(repeat_fields(
        tutors.clone(),
        "Tutor",
        list_len(document, &tutors),
        |item| {
            vec![
                item.field("name", "name", FieldType::Text),
                item.field("subject", "subject", FieldType::Text),
                item.field("bio", "bio", FieldType::Textarea),
                item.field("photoSrc", "photo", FieldType::Image),
            ]
        },
    ));
    fields
}

fn packages_fields(document: &Value) -> Vec<FieldConfig> {
    let items = FieldPath::root().key("items");
    let mut fields = vec![
        FieldConfig::new(FieldPath::root().key("heading"), "Heading", FieldType::Text),
        FieldConfig::new(
            FieldPath::root().key("intro"),
            "Intro",
            FieldType::Textarea,
        ),
    ];
    fields.extend(repeat_fields(
        items.clone(),
        "Package",
        list_len(document, &items),
        |item| {
            vec![
                item.field("name", "name", FieldType::Text),
                item.field("price", "price", FieldType::Text),
                item.field("description", "description", FieldType::Textarea),
                item.field("features", "features", FieldType::StringList),
            ]
        },
    ));
    fields
}

fn testimonials_fields(document: &Value) -> Vec<FieldConfig> {
    let featured = FieldPath::root().key("featured");
    let mut fields = vec![FieldConfig::new(
        FieldPath::root().key("heading"),
        "Heading",
        FieldType::Text,
    )];
    fields.extend(repeat_fields(
        featured.clone(),
        "Testimonial",
        list_len(document, &featured),
        |item| {
            vec![
                item.field("name", "name", FieldType::Text),
                item.field("role", "role", FieldType::Text),
                item.field("quote", "quote", FieldType::Textarea),
                item.field("avatarSrc", "avatar", FieldType::Image),
            ]
        },
    ));
    fields
}

fn results_fields(document: &Value) -> Vec<FieldConfig> {
    let groups = FieldPath::root().key("groups");
    let mut fields = vec![
        FieldConfig::new(FieldPath::root().key("heading"), "Heading", FieldType::Text),
        FieldConfig::new(
            FieldPath::root().key("summary"),
            "Summary",
            FieldType::Textarea,
        ),
    ];
    fields.extend(repeat_fields(
        groups.clone(),
        "Result group",
        list_len(document, &groups),
        |item| {
            vec![
                item.field("label", "label", FieldType::Text),
                item.field(
                    "scores",
                    "scores",
                    FieldType::Table(TableSpec {
                        columns: vec![
                            TableColumn::new("name", "Student"),
                            TableColumn::new("subject", "Subject"),
                            TableColumn::new("grade", "Grade"),
                        ],
                        sort: Some(TableSort {
                            column: "grade".into(),
                            descending: false,
                        }),
                    }),
                ),
            ]
        },
    ));
    fields
}

fn misc_fields(document: &Value) -> Vec<FieldConfig> {
    let faq = FieldPath::root().key("faq");
    let mut fields = vec![
        FieldConfig::new(
            FieldPath::root().key("contact").key("email"),
            "Contact email",
            FieldType::Text,
        ),
        FieldConfig::new(
            FieldPath::root().key("contact").key("phone"),
            "Contact phone",
            FieldType::Text,
        ),
        FieldConfig::new(
            FieldPath::root().key("contact").key("address"),
            "Address",
            FieldType::Textarea,
        ),
        FieldConfig::new(
            FieldPath::root().key("social").key("instagram"),
            "Instagram URL",
            FieldType::Text,
        ),
        FieldConfig::new(
            FieldPath::root().key("social").key("facebook"),
            "Facebook URL",
            FieldType::Text,
        ),
        FieldConfig::new(
            FieldPath::root().key("footer").key("note"),
            "Footer note",
            FieldType::Textarea,
        ),
    ];
    fields.extend(repeat_fields(
        faq.clone(),
        "FAQ item",
        list_len(document, &faq),
        |item| {
            vec![
                item.field("question", "question", FieldType::Text),
                item.field("answer", "answer", FieldType::Textarea),
            ]
        },
    ));
    fields
}
