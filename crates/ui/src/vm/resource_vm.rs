use aarambh_core::model::{ResourceId, ResourceKind, StudyResource};

use super::time_fmt::format_date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceCardVm {
    pub id: ResourceId,
    pub title: String,
    pub subject: String,
    pub kind_label: &'static str,
    pub url: String,
    pub uploaded_label: String,
}

#[must_use]
pub fn map_resource_cards(resources: &[StudyResource]) -> Vec<ResourceCardVm> {
    resources
        .iter()
        .map(|r| ResourceCardVm {
            id: r.id(),
            title: r.title().to_string(),
            subject: r.subject().to_string(),
            kind_label: match r.kind() {
                ResourceKind::Video => "Video",
                ResourceKind::Article => "Article",
                ResourceKind::Document => "Document",
                ResourceKind::Link => "Link",
            },
            url: r.url().to_string(),
            uploaded_label: format_date(r.uploaded_at()),
        })
        .collect()
}
