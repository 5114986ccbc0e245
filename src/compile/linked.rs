//! Linked-entity resolution: join the linked table, or constrain the foreign
//! key column directly.
//!
//! | Reference                      | Linked store | Outcome                   |
//! |--------------------------------|--------------|---------------------------|
//! | bare ids                       | any          | flat foreign-key condition|
//! | nested filter                  | configured   | join + nested compile     |
//! | nested filter, ids only        | missing      | flat foreign-key condition|
//! | nested filter, other criteria  | missing      | `NoLinkedStore` error     |
//!
//! Dropping criteria that cannot be expressed would widen the result set, so
//! the last case fails instead.

use tracing::debug;

use super::{CompileError, CompileResult};
use crate::filter::{EntityKind, FlatIds, Linked, LinkedFilter, EMPTY_UIDS};

/// Outcome of resolving one [`Linked`] reference.
#[derive(Debug, PartialEq)]
pub enum LinkResolution<'a, 'f, F> {
    /// Join `table` and compile `filter` into the same builder.
    Join { table: &'a str, filter: &'f F },
    /// Constrain the referencing table's foreign key.
    Flat(FlatIds<'f>),
}

/// Decide how to apply `link`.
///
/// `linked_table` is the configured table of `linked_entity`, `field` names
/// the referencing filter field for error reporting.
pub fn resolve<'a, 'f, F: LinkedFilter>(
    link: &'f Linked<F>,
    linked_table: Option<&'a str>,
    linked_entity: EntityKind,
    field: &'static str,
) -> CompileResult<LinkResolution<'a, 'f, F>> {
    match (link, linked_table) {
        (Linked::Ids(ids), _) => Ok(LinkResolution::Flat(FlatIds {
            internal_ids: ids,
            unique_ids: &EMPTY_UIDS,
        })),
        (Linked::Filter(filter), Some(table)) => {
            debug!(%linked_entity, table, field, "joining linked store");
            Ok(LinkResolution::Join {
                table,
                filter: filter.as_ref(),
            })
        }
        (Linked::Filter(filter), None) => match filter.flat_ids() {
            Some(flat) => {
                debug!(%linked_entity, field, "no linked store, using foreign key");
                Ok(LinkResolution::Flat(flat))
            }
            None => Err(CompileError::NoLinkedStore {
                entity: linked_entity,
                field,
            }),
        },
    }
}
