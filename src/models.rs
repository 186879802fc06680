// Data models for the roster

use crate::record::{self, Record};
use serde::{Deserialize, Serialize};

/// Key the student collection is persisted under
pub const STUDENTS_KEY: &str = "roster.students";

/// One student entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub course: String,
    pub age: f64,
}

/// Editable fields of a student, as captured from the form
#[derive(Debug, Clone, PartialEq)]
pub struct StudentFields {
    pub name: String,
    pub course: String,
    pub age: f64,
}

impl StudentFields {
    pub fn new(name: impl Into<String>, course: impl Into<String>, age: f64) -> Self {
        Self {
            name: name.into(),
            course: course.into(),
            age,
        }
    }
}

impl From<&Student> for StudentFields {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            course: student.course.clone(),
            age: student.age,
        }
    }
}

impl Record for Student {
    type Fields = StudentFields;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_fields(id: u64, fields: StudentFields) -> Self {
        Self {
            id,
            name: fields.name,
            course: fields.course,
            age: fields.age,
        }
    }

    fn is_valid(&self) -> bool {
        record::is_valid_id(self.id) && !self.name.trim().is_empty() && !self.course.trim().is_empty() && self.age.is_finite()
    }

    fn storage_key() -> &'static str {
        STUDENTS_KEY
    }

    fn default_dataset() -> Vec<Self> {
        DEFAULT_STUDENTS
            .iter()
            .map(|&(id, name, course, age)| Student {
                id,
                name: name.to_string(),
                course: course.to_string(),
                age,
            })
            .collect()
    }
}

const DEFAULT_STUDENTS: [(u64, &str, &str, f64); 5] = [
    (1, "Ana García", "Mathematics", 20.0),
    (2, "Luis Pérez", "Physics", 22.0),
    (3, "Marta Ruiz", "Computer Science", 19.0),
    (4, "Jorge Díaz", "History", 24.0),
    (5, "Lucía Romero", "Chemistry", 21.0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_serialization() {
        let student = Student::from_fields(1, StudentFields::new("Ana", "Math", 20.0));
        let json = serde_json::to_string(&student).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"Ana","course":"Math","age":20.0}"#);
    }

    #[test]
    fn test_student_deserializes_integer_age() {
        let student: Student = serde_json::from_str(r#"{"id":4,"name":"Bo","course":"Art","age":31}"#).unwrap();
        assert_eq!(student.age, 31.0);
        assert_eq!(student.id, 4);
    }

    #[test]
    fn test_student_validity() {
        assert!(Student::from_fields(1, StudentFields::new("Ana", "Math", 20.0)).is_valid());
        assert!(!Student::from_fields(0, StudentFields::new("Ana", "Math", 20.0)).is_valid());
        assert!(!Student::from_fields(u64::MAX, StudentFields::new("Ana", "Math", 20.0)).is_valid());
        assert!(!Student::from_fields(1, StudentFields::new("  ", "Math", 20.0)).is_valid());
        assert!(!Student::from_fields(1, StudentFields::new("Ana", "", 20.0)).is_valid());
        assert!(!Student::from_fields(1, StudentFields::new("Ana", "Math", f64::NAN)).is_valid());
    }

    #[test]
    fn test_default_dataset_is_valid_collection() {
        let defaults = Student::default_dataset();
        assert_eq!(defaults.len(), DEFAULT_STUDENTS.len());
        assert!(crate::record::is_valid_collection(&defaults));
    }

    #[test]
    fn test_fields_from_student() {
        let student = Student::from_fields(2, StudentFields::new("Luis", "Physics", 22.0));
        let fields = StudentFields::from(&student);
        assert_eq!(fields, StudentFields::new("Luis", "Physics", 22.0));
    }
}
