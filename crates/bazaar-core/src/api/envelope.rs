use serde::{Deserialize, Serialize};

/// List responses arrive either as a bare array or wrapped with pagination.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Paged {
        data: Vec<T>,
        #[serde(default, alias = "total")]
        total_count: Option<u64>,
        #[serde(default)]
        per_page: Option<u64>,
        #[serde(default)]
        current_page: Option<u64>,
        #[serde(default)]
        last_page: Option<u64>,
    },
    Bare(Vec<T>),
}

/// Single resources arrive bare or as `{ "data": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ItemEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ItemEnvelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            ItemEnvelope::Wrapped { data } | ItemEnvelope::Bare(data) => data,
        }
    }
}

/// One page of a list, normalized from either envelope shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub per_page: u64,
    pub current_page: u64,
}

impl<T> ListEnvelope<T> {
    /// `requested_per_page` fills in when the server omits its own page size;
    /// 0 means unpaged. A page is never smaller than the items it holds.
    pub fn into_page(self, requested_per_page: u64) -> ListPage<T> {
        match self {
            ListEnvelope::Paged {
                data,
                total_count,
                per_page,
                current_page,
                last_page,
            } => {
                let per_page = per_page
                    .filter(|p| *p > 0)
                    .unwrap_or(requested_per_page)
                    .max(data.len() as u64);
                let total_count = total_count
                    .or_else(|| last_page.map(|last| last.saturating_mul(per_page)))
                    .unwrap_or(data.len() as u64);
                ListPage {
                    items: data,
                    total_count,
                    per_page,
                    current_page: current_page.unwrap_or(1).max(1),
                }
            }
            ListEnvelope::Bare(items) => ListPage {
                total_count: items.len() as u64,
                per_page: requested_per_page.max(items.len() as u64),
                current_page: 1,
                items,
            },
        }
    }
}

impl<T> ListPage<T> {
    pub fn page_count(&self) -> u64 {
        if self.per_page == 0 {
            return 1;
        }
        self.total_count.div_ceil(self.per_page).max(1)
    }

    /// A pager is only worth showing when there is more than one page.
    pub fn needs_pagination(&self) -> bool {
        self.page_count() > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.page_count()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_paged_envelope() {
        let value = json!({ "data": [1, 2, 3], "total_count": 40, "per_page": 3, "current_page": 2 });
        let envelope: ListEnvelope<i32> = serde_json::from_value(value).expect("parses");
        let page = envelope.into_page(20);

        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.page_count(), 14);
        assert!(page.needs_pagination());
        assert!(page.has_next());
    }

    #[test]
    fn test_bare_array_envelope() {
        let envelope: ListEnvelope<i32> = serde_json::from_value(json!([4, 5])).expect("parses");
        let page = envelope.into_page(20);

        assert_eq!(page.total_count, 2);
        assert_eq!(page.current_page, 1);
        assert!(!page.needs_pagination());
    }

    #[test]
    fn test_total_equal_to_page_size_needs_no_pager() {
        let data: Vec<i32> = (0..12).collect();
        let value = json!({ "data": data, "total_count": 12 });
        let envelope: ListEnvelope<i32> = serde_json::from_value(value).expect("parses");
        let page = envelope.into_page(12);

        assert_eq!(page.items.len(), 12);
        assert!(!page.needs_pagination());
        assert_eq!(page.page_count(), 1);
    }

    #[test]
    fn test_item_envelope_accepts_both_shapes() {
        let wrapped: ItemEnvelope<String> = serde_json::from_value(json!({ "data": "x" })).expect("parses");
        let bare: ItemEnvelope<String> = serde_json::from_value(json!("y")).expect("parses");
        assert_eq!(wrapped.into_inner(), "x");
        assert_eq!(bare.into_inner(), "y");
    }

    #[test]
    fn test_missing_total_falls_back_to_last_page() {
        let value = json!({ "data": [1], "per_page": 10, "last_page": 3 });
        let envelope: ListEnvelope<i32> = serde_json::from_value(value).expect("parses");
        assert_eq!(envelope.into_page(20).total_count, 30);
    }

    #[test]
    fn test_huge_last_page_saturates() {
        let value = json!({ "data": [1], "per_page": 10, "last_page": u64::MAX });
        let envelope: ListEnvelope<i32> = serde_json::from_value(value).expect("parses");
        assert_eq!(envelope.into_page(20).total_count, u64::MAX);
    }

    #[test]
    fn test_unpaged_request_is_a_single_page() {
        let value = json!({ "data": [1, 2, 3] });
        let envelope: ListEnvelope<i32> = serde_json::from_value(value).expect("parses");
        let page = envelope.into_page(0);

        assert_eq!(page.per_page, 3);
        assert_eq!(page.page_count(), 1);
        assert!(!page.needs_pagination());
    }

    #[test]
    fn test_empty_unpaged_list_has_no_pager() {
        let envelope: ListEnvelope<i32> = serde_json::from_value(json!({ "data": [] })).expect("parses");
        let page = envelope.into_page(0);

        assert_eq!(page.page_count(), 1);
        assert!(!page.needs_pagination());
    }
}
