// src/age.rs
// =============================================================================
// Finding bookmarks that are older than the retention window.
//
// A bookmark's age comes from its ADD_DATE attribute (epoch seconds).
// - No ADD_DATE at all: never proposed
// - ADD_DATE present but not a number: proposed only when the settings say
//   UnparseableDates::Expire
//
// `now` is a parameter so the filter is a pure function of its inputs.
// =============================================================================

use crate::bookmarks::{Document, LinkEntry};
use crate::config::{Settings, UnparseableDates};
use chrono::{DateTime, Duration, Utc};

// Links created before `now - settings.retention_days`, in document order.
pub fn expired_links(doc: &Document, now: DateTime<Utc>, settings: &Settings) -> Vec<LinkEntry> {
    let cutoff = now - Duration::days(settings.retention_days);

    doc.links()
        .filter(|(_, link)| match link.created {
            Some(secs) => match DateTime::<Utc>::from_timestamp(secs, 0) {
                Some(created) => created < cutoff,
                None => settings.unparseable_dates == UnparseableDates::Expire,
            },
            None => {
                link.attr("add_date").is_some()
                    && settings.unparseable_dates == UnparseableDates::Expire
            }
        })
        .map(|(id, link)| LinkEntry {
            id,
            text: link.text.clone(),
            url: link.url.clone(),
            path: doc.resolve_path(id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::LinkNode;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> i64 {
        (now() - Duration::days(days)).timestamp()
    }

    fn sample() -> Document {
        let mut doc = Document::new();
        let top = doc.add_folder(doc.root(), None, vec![]);
        let old = doc.add_folder(top, Some("Old".into()), vec![]);
        doc.add_link(old, LinkNode::new("ancient", "https://a.test").with_created(days_ago(2000)));
        doc.add_link(old, LinkNode::new("stale", "https://s.test").with_created(days_ago(181)));
        doc.add_link(top, LinkNode::new("fresh", "https://f.test").with_created(days_ago(10)));
        doc.add_link(top, LinkNode::new("edge", "https://e.test").with_created(days_ago(180)));
        doc.add_link(top, LinkNode::new("undated", "https://u.test"));
        let mut garbled = LinkNode::new("garbled", "https://g.test");
        garbled.attrs.push(("add_date".into(), "last week".into()));
        doc.add_link(top, garbled);
        doc
    }

    #[test]
    fn test_selects_only_links_past_cutoff() {
        let doc = sample();
        let expired = expired_links(&doc, now(), &Settings::default());
        let names: Vec<_> = expired.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(names, vec!["ancient", "stale"]);
        assert_eq!(expired[0].path, vec!["Old"]);
    }

    #[test]
    fn test_undated_link_is_never_selected() {
        let doc = sample();
        let settings = Settings {
            retention_days: 0,
            unparseable_dates: UnparseableDates::Expire,
            ..Settings::default()
        };
        let expired = expired_links(&doc, now(), &settings);
        assert!(expired.iter().all(|e| e.text != "undated"));
    }

    #[test]
    fn test_unparseable_dates_follow_settings() {
        let doc = sample();
        let skip = expired_links(&doc, now(), &Settings::default());
        assert!(skip.iter().all(|e| e.text != "garbled"));

        let settings = Settings {
            unparseable_dates: UnparseableDates::Expire,
            ..Settings::default()
        };
        let expire = expired_links(&doc, now(), &settings);
        assert!(expire.iter().any(|e| e.text == "garbled"));
    }

    #[test]
    fn test_retention_window_is_configurable() {
        let doc = sample();
        let settings = Settings {
            retention_days: 5,
            ..Settings::default()
        };
        let expired = expired_links(&doc, now(), &settings);
        assert_eq!(expired.len(), 4);
    }
}
