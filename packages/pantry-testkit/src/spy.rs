use std::{
	collections::HashMap,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use pantry_storage::{BoxFuture, CatalogStore, Error, LookupHit, LookupScope, Result, models::Item};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	VectorLookup,
	FullTextLookup,
	FuzzyLookup,
	ExactLookup,
	FetchItems,
}
impl Operation {
	pub const ALL: [Operation; 5] = [
		Self::VectorLookup,
		Self::FullTextLookup,
		Self::FuzzyLookup,
		Self::ExactLookup,
		Self::FetchItems,
	];

	fn index(self) -> usize {
		match self {
			Self::VectorLookup => 0,
			Self::FullTextLookup => 1,
			Self::FuzzyLookup => 2,
			Self::ExactLookup => 3,
			Self::FetchItems => 4,
		}
	}
}

#[derive(Clone, Copy, Debug)]
pub enum Fault {
	Fail,
	Delay(Duration),
}

/// Wraps a store, counting every call and optionally injecting failures or latency per operation.
pub struct SpyCatalog<S> {
	inner: S,
	calls: [AtomicUsize; 5],
	faults: HashMap<Operation, Fault>,
}
impl<S> SpyCatalog<S>
where
	S: CatalogStore,
{
	pub fn new(inner: S) -> Self {
		Self { inner, calls: Default::default(), faults: HashMap::new() }
	}

	pub fn with_fault(mut self, operation: Operation, fault: Fault) -> Self {
		self.faults.insert(operation, fault);

		self
	}

	pub fn into_arc(self) -> Arc<Self> {
		Arc::new(self)
	}

	pub fn calls(&self, operation: Operation) -> usize {
		self.calls[operation.index()].load(Ordering::SeqCst)
	}

	pub fn total_calls(&self) -> usize {
		Operation::ALL.iter().map(|operation| self.calls(*operation)).sum()
	}

	async fn enter(&self, operation: Operation) -> Result<()> {
		self.calls[operation.index()].fetch_add(1, Ordering::SeqCst);

		match self.faults.get(&operation) {
			Some(Fault::Fail) => Err(Error::Sqlx(sqlx::Error::PoolTimedOut)),
			Some(Fault::Delay(delay)) => {
				tokio::time::sleep(*delay).await;

				Ok(())
			},
			None => Ok(()),
		}
	}
}
impl<S> CatalogStore for SpyCatalog<S>
where
	S: CatalogStore,
{
	fn vector_lookup<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u32,
		threshold: f32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(async move {
			self.enter(Operation::VectorLookup).await?;
			self.inner.vector_lookup(vector, limit, threshold, scope).await
		})
	}

	fn full_text_lookup<'a>(
		&'a self,
		terms: &'a [String],
		limit: u32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(async move {
			self.enter(Operation::FullTextLookup).await?;
			self.inner.full_text_lookup(terms, limit, scope).await
		})
	}

	fn fuzzy_lookup<'a>(
		&'a self,
		term: &'a str,
		limit: u32,
		min_similarity: f32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(async move {
			self.enter(Operation::FuzzyLookup).await?;
			self.inner.fuzzy_lookup(term, limit, min_similarity, scope).await
		})
	}

	fn exact_lookup<'a>(
		&'a self,
		text: &'a str,
		limit: u32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(async move {
			self.enter(Operation::ExactLookup).await?;
			self.inner.exact_lookup(text, limit, scope).await
		})
	}

	fn fetch_items<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<Vec<Arc<Item>>>> {
		Box::pin(async move {
			self.enter(Operation::FetchItems).await?;
			self.inner.fetch_items(ids).await
		})
	}
}

#[cfg(test)]
mod tests {
	use pantry_storage::memory::MemoryCatalog;

	use super::*;
	use crate::fixtures;

	#[tokio::test]
	async fn counts_calls_and_injects_failures() {
		let catalog =
			MemoryCatalog::from_items(fixtures::sample_catalog()).expect("Failed to build catalog.");
		let spy = SpyCatalog::new(catalog).with_fault(Operation::VectorLookup, Fault::Fail);
		let scope = LookupScope::default();

		spy.exact_lookup("egg", 5, &scope).await.expect("Exact lookup failed.");
		spy.exact_lookup("toast", 5, &scope).await.expect("Exact lookup failed.");

		assert!(spy.vector_lookup(&[1.0], 5, 0.1, &scope).await.is_err());
		assert_eq!(spy.calls(Operation::ExactLookup), 2);
		assert_eq!(spy.calls(Operation::VectorLookup), 1);
		assert_eq!(spy.calls(Operation::FuzzyLookup), 0);
		assert_eq!(spy.total_calls(), 3);
	}
}
