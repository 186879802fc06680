// Form capture: raw input -> validated store commands

use crate::models::{Student, StudentFields};
use crate::record;
use crate::storage::KeyValueStorage;
use crate::store::Store;
use thiserror::Error;

/// Rejected form input; the store is never touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("name is required")]
    MissingName,

    #[error("course is required")]
    MissingCourse,

    #[error("age must be a finite number, got {0:?}")]
    InvalidAge(String),

    #[error("id must be a positive integer, got {0:?}")]
    InvalidId(String),
}

/// Raw form fields as typed by the user
///
/// An empty `id` means a new record; a filled one means an edit in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub id: String,
    pub name: String,
    pub course: String,
    pub age: String,
}

/// What a valid form submission asks the store to do
#[derive(Debug, Clone, PartialEq)]
pub enum FormCommand {
    Create(StudentFields),
    Update(u64, StudentFields),
}

/// Outcome of applying a command
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Created(Student),
    Updated(u64),
    /// Update targeted an id the store does not hold; nothing changed
    Missing(u64),
}

impl FormInput {
    /// Blank form for a new record
    pub fn new(name: impl Into<String>, course: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            course: course.into(),
            age: age.into(),
        }
    }

    /// Form pre-filled with an existing record, ready for editing
    pub fn for_edit(student: &Student) -> Self {
        Self {
            id: student.id.to_string(),
            name: student.name.clone(),
            course: student.course.clone(),
            age: student.age.to_string(),
        }
    }

    /// Whether this form is editing an existing record
    pub fn is_editing(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Validate and turn the input into a command
    pub fn parse(&self) -> Result<FormCommand, FormError> {
        let fields = self.fields()?;

        let id = self.id.trim();
        if id.is_empty() {
            return Ok(FormCommand::Create(fields));
        }

        match id.parse::<u64>() {
            Ok(id) if record::is_valid_id(id) => Ok(FormCommand::Update(id, fields)),
            _ => Err(FormError::InvalidId(self.id.clone())),
        }
    }

    fn fields(&self) -> Result<StudentFields, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }

        let course = self.course.trim();
        if course.is_empty() {
            return Err(FormError::MissingCourse);
        }

        let age = parse_age(&self.age)?;

        Ok(StudentFields::new(name, course, age))
    }
}

fn parse_age(raw: &str) -> Result<f64, FormError> {
    match raw.trim().parse::<f64>() {
        Ok(age) if age.is_finite() => Ok(age),
        _ => Err(FormError::InvalidAge(raw.to_string())),
    }
}

/// Run a validated command against the store
pub fn apply<S: KeyValueStorage>(store: &mut Store<Student, S>, command: FormCommand) -> Applied {
    match command {
        FormCommand::Create(fields) => Applied::Created(store.create(fields)),
        FormCommand::Update(id, fields) => {
            if store.update(id, fields) {
                Applied::Updated(id)
            } else {
                Applied::Missing(id)
            }
        }
    }
}

/// Parse and apply in one step, as a form submit handler would
pub fn submit<S: KeyValueStorage>(store: &mut Store<Student, S>, input: &FormInput) -> Result<Applied, FormError> {
    let command = input.parse()?;
    Ok(apply(store, command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn empty_store() -> Store<Student, MemoryStorage> {
        Store::empty(MemoryStorage::new())
    }

    #[test]
    fn test_parse_create_trims_fields() {
        let input = FormInput::new("  Ana ", " Math\t", " 20 ");
        assert_eq!(
            input.parse().unwrap(),
            FormCommand::Create(StudentFields::new("Ana", "Math", 20.0))
        );
        assert!(!input.is_editing());
    }

    #[test]
    fn test_parse_update() {
        let input = FormInput {
            id: "3".to_string(),
            ..FormInput::new("Ana", "Math", "20.5")
        };
        assert_eq!(
            input.parse().unwrap(),
            FormCommand::Update(3, StudentFields::new("Ana", "Math", 20.5))
        );
        assert!(input.is_editing());
    }

    #[test]
    fn test_parse_rejects_missing_text() {
        assert_eq!(FormInput::new("   ", "Math", "20").parse(), Err(FormError::MissingName));
        assert_eq!(FormInput::new("Ana", "", "20").parse(), Err(FormError::MissingCourse));
    }

    #[test]
    fn test_parse_rejects_bad_age() {
        for age in ["", "abc", "inf", "NaN", "-inf"] {
            let err = FormInput::new("Ana", "Math", age).parse().unwrap_err();
            assert_eq!(err, FormError::InvalidAge(age.to_string()));
        }
    }

    #[test]
    fn test_parse_rejects_zero_and_garbage_ids() {
        for id in ["0", "-1", "x", "1.5", "9007199254740992"] {
            let input = FormInput {
                id: id.to_string(),
                ..FormInput::new("Ana", "Math", "20")
            };
            assert_eq!(input.parse(), Err(FormError::InvalidId(id.to_string())));
        }
    }

    #[test]
    fn test_for_edit_round_trip() {
        let student = Student {
            id: 4,
            name: "Jorge".to_string(),
            course: "History".to_string(),
            age: 24.0,
        };
        let input = FormInput::for_edit(&student);
        assert_eq!(input.id, "4");
        assert_eq!(input.age, "24");
        assert_eq!(
            input.parse().unwrap(),
            FormCommand::Update(4, StudentFields::from(&student))
        );
    }

    #[test]
    fn test_submit_create_then_edit() {
        let mut store = empty_store();

        let ana = match submit(&mut store, &FormInput::new("Ana", "Math", "20")).unwrap() {
            Applied::Created(student) => student,
            other => panic!("expected create, got {:?}", other),
        };
        assert_eq!(ana.id, 1);

        let mut edit = FormInput::for_edit(&ana);
        edit.course = "Physics".to_string();
        assert_eq!(submit(&mut store, &edit).unwrap(), Applied::Updated(1));
        assert_eq!(store.get(1).unwrap().course, "Physics");
    }

    #[test]
    fn test_submit_update_missing_id() {
        let mut store = empty_store();
        store.create(StudentFields::new("Ana", "Math", 20.0));
        let before = store.list().to_vec();

        let input = FormInput {
            id: "9".to_string(),
            ..FormInput::new("Ghost", "None", "1")
        };
        assert_eq!(submit(&mut store, &input).unwrap(), Applied::Missing(9));
        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn test_submit_invalid_leaves_store_untouched() {
        let mut store = empty_store();
        assert!(submit(&mut store, &FormInput::new("", "Math", "20")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_form_error_messages() {
        assert_eq!(FormError::MissingName.to_string(), "name is required");
        assert!(FormError::InvalidAge("x".to_string()).to_string().contains("\"x\""));
    }
}
