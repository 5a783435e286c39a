// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Non-owning link from a record back to the client that created it.

use std::any::Any;
use std::sync::{Arc, Weak};

/// A weak, type-erased reference to a client.
///
/// Records carry one so they can be enqueued without passing the client
/// around. The handle never keeps the client alive; once the client is
/// dropped, [`ClientHandle::upgrade`] returns `None`.
#[derive(Clone)]
pub struct ClientHandle {
	inner: Weak<dyn Any + Send + Sync>,
}

impl ClientHandle {
	pub fn new<T: Any + Send + Sync>(client: &Arc<T>) -> Self {
		let strong: Arc<dyn Any + Send + Sync> = client.clone();
		Self {
			inner: Arc::downgrade(&strong),
		}
	}

	/// Resolves the handle to the concrete client state, if still alive.
	pub fn upgrade<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.inner.upgrade()?.downcast::<T>().ok()
	}
}

impl std::fmt::Debug for ClientHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClientHandle")
			.field("alive", &(self.inner.strong_count() > 0))
			.finish()
	}
}
