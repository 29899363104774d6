use crate::filter::FilterList;

/// A single subscription a client holds against one relay: an identifier
/// unique within that relay, and the `FilterList` it was opened with.
/// Subscriptions carry no back-pointer to their owning relay — dispatch
/// resolves by id, the relay's map is the only place the association
/// lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
  pub id: String,
  pub filters: FilterList,
}

impl Subscription {
  pub fn new(id: String, filters: FilterList) -> Self {
    Self { id, filters }
  }

  pub fn matches(&self, event: &crate::event::Event) -> bool {
    self.filters.matches(event)
  }
}
