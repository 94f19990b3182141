//! A minimal page model: elements addressed by id, text fields and forms.
//!
//! Everything here lives on one thread. Fields and forms are shared handles
//! (`Rc<RefCell<_>>`) so listeners can capture them the way DOM listeners
//! capture elements.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::error::BridgeError;

pub type SubmitListener = Box<dyn FnMut()>;

/// An element registered in a [`Document`].
#[derive(Clone, Debug)]
pub enum Element {
    /// A mount point for a widget.
    Container(String),
    /// A text field holding a submittable value.
    Field(Field),
    /// A form owning fields.
    Form(Form),
}

impl Element {
    pub fn id(&self) -> String {
        match self {
            Element::Container(id) => id.clone(),
            Element::Field(field) => field.id(),
            Element::Form(form) => form.id(),
        }
    }
}

/// Registry of elements by id.
#[derive(Default)]
pub struct Document {
    elements: HashMap<String, Element>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            elements: HashMap::new(),
        }
    }

    pub fn add_container(&mut self, id: &str) {
        self.elements
            .insert(id.to_string(), Element::Container(id.to_string()));
    }

    pub fn add_form(&mut self, id: &str) -> Form {
        let form = Form::new(id);
        self.elements
            .insert(id.to_string(), Element::Form(form.clone()));
        form
    }

    /// Register a text field, optionally owned by `form`.
    pub fn add_field(&mut self, id: &str, name: &str, value: &str, form: Option<&Form>) -> Field {
        let field = Field::new(id, name, value, form);
        if let Some(form) = form {
            form.inner.borrow_mut().fields.push(field.clone());
        }
        self.elements
            .insert(id.to_string(), Element::Field(field.clone()));
        field
    }

    /// Look up an element by id.
    pub fn element(&self, id: &str) -> Result<&Element, BridgeError> {
        self.elements
            .get(id)
            .ok_or_else(|| BridgeError::ElementNotFound(id.to_string()))
    }

    /// Look up a text field by id.
    pub fn field(&self, id: &str) -> Result<Field, BridgeError> {
        match self.element(id)? {
            Element::Field(field) => Ok(field.clone()),
            _ => Err(BridgeError::NotAField(id.to_string())),
        }
    }
}

struct FieldInner {
    id: String,
    name: String,
    value: String,
    form: Weak<RefCell<FormInner>>,
}

/// Shared handle to a text field.
#[derive(Clone)]
pub struct Field {
    inner: Rc<RefCell<FieldInner>>,
}

impl Field {
    fn new(id: &str, name: &str, value: &str, form: Option<&Form>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(FieldInner {
                id: id.to_string(),
                name: name.to_string(),
                value: value.to_string(),
                form: form.map(|f| Rc::downgrade(&f.inner)).unwrap_or_default(),
            })),
        }
    }

    pub fn id(&self) -> String {
        self.inner.borrow().id.clone()
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// Current value; an unset field reads as the empty string.
    pub fn value(&self) -> String {
        self.inner.borrow().value.clone()
    }

    pub fn set_value(&self, value: &str) {
        self.inner.borrow_mut().value = value.to_string();
    }

    /// The form this field belongs to, if any.
    pub fn form(&self) -> Option<Form> {
        self.inner
            .borrow()
            .form
            .upgrade()
            .map(|inner| Form { inner })
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Field")
            .field("id", &inner.id)
            .field("name", &inner.name)
            .field("value", &inner.value)
            .finish()
    }
}

struct FormInner {
    id: String,
    fields: Vec<Field>,
    submit_listeners: Vec<SubmitListener>,
}

/// Shared handle to a form.
#[derive(Clone)]
pub struct Form {
    inner: Rc<RefCell<FormInner>>,
}

impl Form {
    fn new(id: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(FormInner {
                id: id.to_string(),
                fields: Vec::new(),
                submit_listeners: Vec::new(),
            })),
        }
    }

    pub fn id(&self) -> String {
        self.inner.borrow().id.clone()
    }

    /// Register a listener run on every submission, before the fields are
    /// serialized.
    pub fn on_submit(&self, listener: impl FnMut() + 'static) {
        self.inner
            .borrow_mut()
            .submit_listeners
            .push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().submit_listeners.len()
    }

    /// Submit the form: run every submit listener to completion, then
    /// serialize the named fields.
    pub fn submit(&self) -> Submission {
        let mut listeners = std::mem::take(&mut self.inner.borrow_mut().submit_listeners);
        for listener in listeners.iter_mut() {
            listener();
        }
        {
            // Listeners registered during dispatch go after the existing ones.
            let mut inner = self.inner.borrow_mut();
            let added = std::mem::replace(&mut inner.submit_listeners, listeners);
            inner.submit_listeners.extend(added);
        }

        let inner = self.inner.borrow();
        let entries: Vec<(String, String)> = inner
            .fields
            .iter()
            .map(|field| (field.name(), field.value()))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        debug!(form = %inner.id, fields = entries.len(), "form submitted");
        Submission { entries }
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Form")
            .field("id", &inner.id)
            .field("fields", &inner.fields.len())
            .field("submit_listeners", &inner.submit_listeners.len())
            .finish()
    }
}

/// The serialized `(name, value)` pairs of a submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    entries: Vec<(String, String)>,
}

impl Submission {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

impl fmt::Display for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            writeln!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}
