// core/src/orders/mod.rs

//! Order board: listing, creation, reconciliation, manual actions and
//! background refresh.

pub mod dispatcher;
pub mod form;
pub mod listing;
pub mod refresh;
pub mod view_model;

pub use dispatcher::{ActionContext, ActionDispatcher, CheckoutOpener, OrderAction};
pub use form::{rupees_to_paise, NewOrderForm};
pub use listing::{filter_orders, merge_listing, select_active, status_options, StatusFilter};
pub use refresh::AutoRefresher;
pub use view_model::{OrderListState, OrderListViewModel};
