use serde::{Deserialize, Serialize};

/// One page of a filtered listing. `total` counts the filtered set before slicing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Slices `items` to the 1-based `page` of `page_size` entries. Page 0 is treated as page 1.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let total = items.len();
    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    let items = items.into_iter().skip(start).take(page_size).collect();
    Page { items, total }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_page_of_eight() {
        let page = paginate((0..30).collect::<Vec<_>>(), 2, 8);
        assert_eq!(page.items, (8..16).collect::<Vec<_>>());
        assert_eq!(page.total, 30);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let page = paginate(vec![1, 2, 3], 5, 8);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_page_zero_behaves_like_first_page() {
        let page = paginate(vec![1, 2, 3], 0, 2);
        assert_eq!(page.items, vec![1, 2]);
    }
}
