//! Emulated object references (spec.md §4.2 "Objects and static fields":
//! `new-instance` asks the invocation bridge to produce a fresh emulated
//! object).
//!
//! Real Dalvik objects carry arbitrary instance state; this emulator only
//! ever needs to model the handful of built-in classes spec.md §4.4 names
//! (`StringBuilder`, and whatever an emitted `ArithmeticException`/
//! `ArrayIndexOutOfBoundsException` needs to carry for catch-type matching),
//! plus an opaque placeholder for any other `new-instance` target.

use std::cell::RefCell;
use std::rc::Rc;

/// State backing an emulated object. `StringBuilder` is the only built-in
/// class with mutable instance state the core opcode set touches directly;
/// anything else is `Plain`, identified only by its class descriptor.
#[derive(Debug)]
pub enum EmulatedObject {
    StringBuilder(Vec<u8>),
    Plain { class: String },
}

impl EmulatedObject {
    pub fn class_name(&self) -> &str {
        match self {
            EmulatedObject::StringBuilder(_) => "Ljava/lang/StringBuilder;",
            EmulatedObject::Plain { class } => class,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectRef(pub Rc<RefCell<EmulatedObject>>);

impl ObjectRef {
    pub fn new(obj: EmulatedObject) -> Self {
        Self(Rc::new(RefCell::new(obj)))
    }

    pub fn class_name(&self) -> String {
        self.0.borrow().class_name().to_string()
    }

    pub fn display(&self) -> String {
        match &*self.0.borrow() {
            EmulatedObject::StringBuilder(buf) => String::from_utf8_lossy(buf).into_owned(),
            EmulatedObject::Plain { class } => format!("<instance of {class}>"),
        }
    }
}
