pub(crate) mod action;
pub(crate) mod arrange;
pub(crate) mod decorate;
pub(crate) mod op;
pub(crate) mod rendered;
pub(crate) mod request;
pub(crate) mod sync;
pub(crate) mod transaction;
pub(crate) mod trim;

#[cfg(test)]
#[path = "../../tests/unit/edit/fixture.rs"]
pub(crate) mod fixture;
