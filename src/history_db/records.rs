use diesel::sqlite::SqliteConnection;
use std::collections::VecDeque;

use super::connection::ConnectionPool;
use super::Result;

/// A read query that can be executed one page at a time.
///
/// Pages are ordered by a unique key, each following page starts strictly after the
/// key of the last row of its predecessor (keyset pagination).
pub trait PagedQuery {
    type Item;
    type Key;

    fn load_page(
        &self,
        conn: &SqliteConnection,
        after: Option<&Self::Key>,
        limit: i64,
    ) -> Result<Vec<Self::Item>>;

    fn key_of(item: &Self::Item) -> Self::Key;
}

/// Lazy, forward-only sequence of query results.
///
/// Rows are fetched page by page while iterating. Every page borrows a connection from the
/// pool and hands it back before any of its rows are yielded, so holding on to a Records
/// instance never blocks other operations. This is no live view: rows inserted behind the
/// current position show up, to see a consistent fresh result simply issue the query again.
///
/// Iteration ends after the first error.
pub struct Records<Q: PagedQuery> {
    pool: ConnectionPool,
    query: Q,
    page_size: i64,

    last_key: Option<Q::Key>,
    buffer: VecDeque<Q::Item>,
    exhausted: bool,
}

impl<Q: PagedQuery> Records<Q> {
    pub(crate) fn new(pool: ConnectionPool, query: Q, page_size: i64) -> Self {
        Records {
            pool,
            query,
            page_size: page_size.max(1),

            last_key: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    fn fetch_next_page(&mut self) -> Result<()> {
        let conn = self.pool.get()?;
        let page = self
            .query
            .load_page(&conn, self.last_key.as_ref(), self.page_size)?;

        if (page.len() as i64) < self.page_size {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.last_key = Some(Q::key_of(last));
        }
        self.buffer.extend(page);

        Ok(())
    }
}

impl<Q: PagedQuery> Iterator for Records<Q> {
    type Item = Result<Q::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(error) = self.fetch_next_page() {
                self.exhausted = true;
                return Some(Err(error));
            }
        }

        self.buffer.pop_front().map(Ok)
    }
}
