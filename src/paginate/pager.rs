use super::{PagedQuery, Pages};
use crate::error::LoungeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagerState {
    New,
    GetNext,
    GetAll,
    Consumed,
}

/// Pull model consumer surfacing one page per call.
///
/// A pager is driven either page by page with [`get_next`](Pager::get_next)
/// or drained in one go with [`get_all`](Pager::get_all), never both. Once
/// the underlying sequence completes the pager is consumed and a new one has
/// to be taken from the [`Pagination`](super::Pagination). Operation errors
/// do not consume the pager, the failed call can be retried.
pub struct Pager<Q: PagedQuery> {
    pages: Pages<Q>,
    state: PagerState,
}

impl<Q: PagedQuery> Pager<Q> {
    pub(crate) fn new(pages: Pages<Q>) -> Self {
        Self {
            pages,
            state: PagerState::New,
        }
    }

    /// `true` while another page may be requested
    pub fn has_next(&self) -> bool {
        self.pages.has_next()
    }

    /// Advance by one page
    pub async fn get_next(&mut self) -> Result<Vec<Q::Row>, LoungeError> {
        match self.state {
            PagerState::Consumed => Err(LoungeError::IllegalState(
                "This pager has been consumed, use a new Pager.".to_string(),
            )),
            PagerState::GetAll => Err(LoungeError::IllegalState(
                "Cannot mix getAll() and getNext(), use only one method or get a new Pager."
                    .to_string(),
            )),
            PagerState::New | PagerState::GetNext => {
                if !self.pages.has_next() {
                    self.state = PagerState::Consumed;
                    return Err(LoungeError::IllegalState(
                        "No more results available.".to_string(),
                    ));
                }
                self.state = PagerState::GetNext;
                match self.pages.next().await {
                    Some(Ok(rows)) => {
                        if !self.pages.has_next() {
                            self.state = PagerState::Consumed;
                        }
                        Ok(rows)
                    }
                    Some(Err(err)) => Err(err),
                    None => {
                        self.state = PagerState::Consumed;
                        Err(LoungeError::IllegalState(
                            "No more results available.".to_string(),
                        ))
                    }
                }
            }
        }
    }

    /// Drain every remaining page into one vector of rows
    pub async fn get_all(&mut self) -> Result<Vec<Q::Row>, LoungeError> {
        match self.state {
            PagerState::Consumed => Err(LoungeError::IllegalState(
                "This pager has been consumed, use a new Pager.".to_string(),
            )),
            PagerState::GetNext => Err(LoungeError::IllegalState(
                "Cannot mix getAll() and getNext(), use only one method or get a new Pager."
                    .to_string(),
            )),
            PagerState::New | PagerState::GetAll => {
                self.state = PagerState::GetAll;
                let mut rows = vec![];
                while let Some(page) = self.pages.next().await {
                    rows.extend(page?);
                }
                self.state = PagerState::Consumed;
                Ok(rows)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::database::types::AllDocsParams;
    use crate::paginate::Pagination;
    use crate::testing::{unavailable, view_page, view_row, FakeCouch};
    use serde_json::json;
    use std::sync::Arc;

    fn two_page_script(fake: &Arc<FakeCouch>) {
        fake.push_view(Ok(view_page(vec![
            view_row("a", json!("a")),
            view_row("b", json!("b")),
            view_row("c", json!("c")),
        ])));
        fake.push_view(Ok(view_page(vec![view_row("c", json!("c"))])));
    }

    #[tokio::test]
    async fn get_next_walks_the_pages_then_reports_consumption() {
        let fake = FakeCouch::shared();
        two_page_script(&fake);
        let pagination =
            Pagination::all_docs(Arc::clone(&fake), AllDocsParams::new("my_db").limit(2)).unwrap();
        let mut pager = pagination.pager();

        assert!(pager.has_next());
        assert_eq!(pager.get_next().await.unwrap().len(), 2);
        assert_eq!(pager.get_next().await.unwrap().len(), 1);
        assert!(!pager.has_next());

        let err = pager.get_next().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "This pager has been consumed, use a new Pager."
        );
    }

    #[tokio::test]
    async fn get_all_drains_everything_at_once() {
        let fake = FakeCouch::shared();
        two_page_script(&fake);
        let pagination =
            Pagination::all_docs(Arc::clone(&fake), AllDocsParams::new("my_db").limit(2)).unwrap();
        let mut pager = pagination.pager();

        assert_eq!(pager.get_all().await.unwrap().len(), 3);
        let err = pager.get_all().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "This pager has been consumed, use a new Pager."
        );
    }

    #[tokio::test]
    async fn the_two_methods_cannot_be_mixed() {
        let fake = FakeCouch::shared();
        two_page_script(&fake);
        let pagination =
            Pagination::all_docs(Arc::clone(&fake), AllDocsParams::new("my_db").limit(2)).unwrap();
        let mut pager = pagination.pager();
        pager.get_next().await.unwrap();
        let err = pager.get_all().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot mix getAll() and getNext(), use only one method or get a new Pager."
        );

        let fake = FakeCouch::shared();
        two_page_script(&fake);
        let pagination =
            Pagination::all_docs(Arc::clone(&fake), AllDocsParams::new("my_db").limit(2)).unwrap();
        let mut pager = pagination.pager();
        pager.get_all().await.unwrap();
        // consumption wins over mixing once the drain finished
        assert!(pager.get_next().await.is_err());
    }

    #[tokio::test]
    async fn errors_do_not_consume_the_pager() {
        let fake = FakeCouch::shared();
        fake.push_view(Err(unavailable()));
        fake.push_view(Ok(view_page(vec![view_row("a", json!("a"))])));
        let pagination =
            Pagination::all_docs(Arc::clone(&fake), AllDocsParams::new("my_db").limit(2)).unwrap();
        let mut pager = pagination.pager();

        assert!(pager.get_next().await.is_err());
        // the retry picks up the same page
        assert_eq!(pager.get_next().await.unwrap().len(), 1);
    }
}
