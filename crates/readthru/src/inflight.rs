// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Table of populations currently in flight, at most one per key.
//!
//! A population runs as its own Tokio task. Its outcome is fanned out through a
//! [`Shared`] future, so callers only ever wait on it: a caller that stops waiting
//! leaves the population running, and the backend is still written when nobody is
//! left to receive the value.
//!
//! The entry for a key is retired by a guard owned by the task, so it goes away on
//! every exit path, including a panicking data source. Retirement is tied to a
//! generation number so a late retire never removes a newer population.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::Error;

/// Encoded value produced by a population, or `None` when the data source had nothing.
pub(crate) type PopulationOutcome = Result<Option<Bytes>, Error>;

pub(crate) type Population = Shared<BoxFuture<'static, PopulationOutcome>>;

/// How a caller got attached to the population for its key.
pub(crate) enum Attachment {
    /// Another caller started the population first.
    Joined(Population),
    /// This caller started the population.
    Started(Population),
}

struct Pending {
    generation: u64,
    population: Population,
}

pub(crate) struct PendingPopulations {
    slots: Arc<DashMap<String, Pending>>,
    generations: AtomicU64,
}

impl fmt::Debug for PendingPopulations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingPopulations").field("len", &self.slots.len()).finish()
    }
}

impl PendingPopulations {
    pub(crate) fn new() -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            generations: AtomicU64::new(0),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Joins the population in flight for `key`, or spawns the one built by `start`.
    ///
    /// `start` runs only when no population is in flight. The shard lock for `key` is
    /// held while deciding, never while waiting.
    pub(crate) fn join_or_start<S>(&self, key: &str, start: S) -> Attachment
    where
        S: FnOnce() -> BoxFuture<'static, PopulationOutcome>,
    {
        match self.slots.entry(key.to_owned()) {
            Entry::Occupied(slot) => Attachment::Joined(slot.get().population.clone()),
            Entry::Vacant(slot) => {
                let ticket = Ticket {
                    slots: Arc::clone(&self.slots),
                    key: key.to_owned(),
                    generation: self.generations.fetch_add(1, Ordering::Relaxed),
                };

                let body = start();
                let task = tokio::spawn({
                    let ticket = ticket.clone();
                    async move {
                        let _retire = RetireOnDrop(ticket);
                        body.await
                    }
                });

                let generation = ticket.generation;
                let population = async move {
                    match task.await {
                        Ok(outcome) => outcome,
                        Err(aborted) => {
                            // The task may never have been polled, e.g. during runtime shutdown.
                            ticket.retire();
                            Err(Error::data_source(&ticket.key, aborted))
                        }
                    }
                }
                .boxed()
                .shared();

                slot.insert(Pending {
                    generation,
                    population: population.clone(),
                });
                Attachment::Started(population)
            }
        }
    }
}

/// Identifies one population of one key.
#[derive(Clone)]
struct Ticket {
    slots: Arc<DashMap<String, Pending>>,
    key: String,
    generation: u64,
}

impl Ticket {
    fn retire(&self) {
        // A newer population for the same key must stay registered.
        self.slots.remove_if(&self.key, |_, pending| pending.generation == self.generation);
    }
}

struct RetireOnDrop(Ticket);

impl Drop for RetireOnDrop {
    fn drop(&mut self) {
        self.0.retire();
    }
}
