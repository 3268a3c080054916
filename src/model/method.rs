use crate::errors::Error;
use std::{fmt, sync::Arc};

/// The declared shape of a hook, test method, or rule field. Discovery
/// mechanisms fill this in so the engine can reject malformed declarations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    pub public: bool,
    pub is_static: bool,
    /// Number of declared parameters.
    pub params: usize,
    /// `false` when the method returns something other than unit.
    pub returns_unit: bool,
}

impl Signature {
    /// `public`, zero-argument, unit-returning instance method.
    pub const INSTANCE: Signature = Signature {
        public: true,
        is_static: false,
        params: 0,
        returns_unit: true,
    };

    /// `public`, zero-argument, unit-returning static method.
    pub const STATIC: Signature = Signature {
        public: true,
        is_static: true,
        params: 0,
        returns_unit: true,
    };
}

type MethodBody = Arc<dyn Fn() -> Result<(), Error> + Send + Sync>;

/// A hook or test method of a test class.
#[derive(Clone)]
pub struct FrameworkMethod {
    name: String,
    signature: Signature,
    body: MethodBody,
    ignored: Option<String>,
    metadata: Vec<String>,
}

impl FrameworkMethod {
    pub fn new(
        name: impl Into<String>,
        body: impl Fn() -> Result<(), Error> + Send + Sync + 'static,
    ) -> Self {
        FrameworkMethod {
            name: name.into(),
            signature: Signature::INSTANCE,
            body: Arc::new(body),
            ignored: None,
            metadata: Vec::new(),
        }
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    /// Mark the method as ignored. Ignored tests are reported but never
    /// started.
    pub fn ignore(mut self, reason: impl Into<String>) -> Self {
        self.ignored = Some(reason.into());
        self
    }

    /// Attach a metadata tag, carried into the method's description.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.metadata.push(tag.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored.is_some()
    }

    pub fn ignore_reason(&self) -> Option<&str> {
        self.ignored.as_deref()
    }

    pub fn metadata(&self) -> &[String] {
        &self.metadata
    }

    /// Call the body. Panics are not caught here; statements catch them.
    pub fn invoke(&self) -> Result<(), Error> {
        (self.body)()
    }

    /// Push a message onto `errors` for each way this method differs from a
    /// public, zero-argument, unit-returning method of the given
    /// static-ness.
    pub fn validate_public_void_no_arg(
        &self,
        is_static: bool,
        errors: &mut Vec<String>,
    ) {
        let Signature {
            public,
            is_static: declared_static,
            params,
            returns_unit,
        } = self.signature;
        if declared_static != is_static {
            let state = if is_static { "should" } else { "should not" };
            errors.push(format!("Method {}() {} be static", self.name, state));
        }
        if !public {
            errors.push(format!("Method {}() should be public", self.name));
        }
        if params != 0 {
            errors.push(format!(
                "Method {}() should have no parameters",
                self.name
            ));
        }
        if !returns_unit {
            errors.push(format!("Method {}() should be void", self.name));
        }
    }
}

impl fmt::Debug for FrameworkMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FrameworkMethod")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("ignored", &self.ignored)
            .finish()
    }
}
