//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use lcommon::{MetadataMap, RequestId, SamplingParams};
//!
//! let request = RequestId::from("req-1");
//! let mut headers = MetadataMap::new();
//! headers.insert("Content-Type".to_string(), "application/json".to_string());
//!
//! let sampling = SamplingParams::new(256, 0.7).with_stop_sequence("</s>");
//! assert_eq!(request.as_str(), "req-1");
//! assert_eq!(sampling.stop_sequences, vec!["</s>".to_string()]);
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use lcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Header maps and request identifier newtypes.

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    /// Identifies one outstanding answer request on a channel.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct RequestId(String);

    impl RequestId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn sequential(sequence: u64) -> Self {
            Self(format!("req-{sequence}"))
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for RequestId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for RequestId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for RequestId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod model {
    //! Sampling settings sent alongside a formatted prompt.
    //!
    //! ```rust
    //! use lcommon::SamplingParams;
    //!
    //! let params = SamplingParams::new(128, 0.2)
    //!     .with_stop_sequences(vec!["<|im_end|>".to_string()]);
    //!
    //! assert_eq!(params.max_tokens, 128);
    //! assert_eq!(params.temperature, 0.2);
    //! assert_eq!(params.stop_sequences.len(), 1);
    //! ```

    #[derive(Debug, Clone, PartialEq)]
    pub struct SamplingParams {
        pub max_tokens: u32,
        pub temperature: f32,
        pub stop_sequences: Vec<String>,
    }

    impl SamplingParams {
        pub fn new(max_tokens: u32, temperature: f32) -> Self {
            Self {
                max_tokens,
                temperature,
                stop_sequences: Vec::new(),
            }
        }

        pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
            self.stop_sequences = stop_sequences;
            self
        }

        pub fn with_stop_sequence(mut self, stop: impl Into<String>) -> Self {
            self.stop_sequences.push(stop.into());
            self
        }
    }

    impl Default for SamplingParams {
        fn default() -> Self {
            Self::new(1000, 1.0)
        }
    }
}

pub mod registry {
    //! Registries keyed by model identifiers.
    //!
    //! Identifiers are normalized on the way in and on lookup, so `ChatML`,
    //! ` chatml ` and `chatml` name the same entry.
    //!
    //! ```rust
    //! use lcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("ChatML", 1_u32);
    //!
    //! assert_eq!(registry.get(" chatml "), Some(&1));
    //! assert_eq!(registry.ids(), vec!["chatml".to_string()]);
    //! ```

    use std::collections::HashMap;

    /// Lookup form of a model identifier: trimmed and ASCII-lowercased.
    pub fn normalize_id(id: &str) -> String {
        id.trim().to_ascii_lowercase()
    }

    #[derive(Debug, Clone)]
    pub struct Registry<V> {
        items: HashMap<String, V>,
    }

    impl<V> Default for Registry<V> {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<V> Registry<V> {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, id: &str, value: V) -> Option<V> {
            self.items.insert(normalize_id(id), value)
        }

        pub fn get(&self, id: &str) -> Option<&V> {
            self.items.get(&normalize_id(id))
        }

        pub fn contains(&self, id: &str) -> bool {
            self.items.contains_key(&normalize_id(id))
        }

        /// Normalized identifiers in sorted order.
        pub fn ids(&self) -> Vec<String> {
            let mut ids = self.items.keys().cloned().collect::<Vec<_>>();
            ids.sort();
            ids
        }
    }
}

pub use context::{MetadataMap, RequestId};
pub use future::BoxFuture;
pub use model::SamplingParams;
pub use registry::{Registry, normalize_id};

#[cfg(test)]
mod tests {
    use super::{Registry, RequestId, SamplingParams, normalize_id};

    #[test]
    fn request_ids_format_sequence_numbers() {
        let request = RequestId::sequential(7);
        let named = RequestId::from("custom");

        assert_eq!(request.as_str(), "req-7");
        assert_eq!(request.to_string(), "req-7");
        assert_eq!(named.as_str(), "custom");
    }

    #[test]
    fn sampling_params_builder_helpers_set_values() {
        let params = SamplingParams::new(64, 0.3)
            .with_stop_sequence("a")
            .with_stop_sequence("b");

        assert_eq!(params.max_tokens, 64);
        assert_eq!(params.temperature, 0.3);
        assert_eq!(params.stop_sequences, vec!["a".to_string(), "b".to_string()]);

        let replaced = params.with_stop_sequences(Vec::new());
        assert!(replaced.stop_sequences.is_empty());
    }

    #[test]
    fn registry_normalizes_identifiers() {
        let mut registry = Registry::new();
        assert!(registry.ids().is_empty());

        assert_eq!(registry.insert("Llama3", 1_u32), None);
        assert_eq!(registry.insert(" llama3", 2_u32), Some(1));
        assert_eq!(registry.get("LLAMA3 "), Some(&2));
        assert!(registry.contains("llama3"));
        assert!(!registry.contains("chatml"));

        registry.insert("chatml", 3);
        assert_eq!(registry.ids(), vec!["chatml".to_string(), "llama3".to_string()]);
        assert_eq!(normalize_id("  OpenChat "), "openchat");
    }
}
