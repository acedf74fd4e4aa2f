// Curriculum validation and normalization.
//
// Modules are validated as a whole first: every module needs a non-blank title,
// description and duration, and each violation is reported separately. Valid input
// is then normalized in array order so that `order` always equals the position.

use crate::models::{Lesson, LessonInput, Module, ModuleInput, Resource, ResourceInput};
use crate::utils::{generate_short_id, trim_optional_field};

pub const DEFAULT_LESSON_TYPE: &str = "reading";
pub const DEFAULT_LESSON_DURATION: &str = "15 minutes";
pub const DEFAULT_RESOURCE_TYPE: &str = "link";

/// One message per missing module field, e.g. "Module 2: duration is required"
pub fn validate_modules(inputs: &[ModuleInput]) -> Vec<String> {
    let mut problems = Vec::new();

    for (index, module) in inputs.iter().enumerate() {
        let checks = [
            ("title", &module.title),
            ("description", &module.description),
            ("duration", &module.duration),
        ];
        for (field, value) in checks {
            if trim_optional_field(value.as_ref()).is_none() {
                problems.push(format!("Module {}: {} is required", index + 1, field));
            }
        }
    }

    problems
}

/// Validate then normalize a full module list
pub fn normalize_modules(inputs: Vec<ModuleInput>) -> Result<Vec<Module>, Vec<String>> {
    let problems = validate_modules(&inputs);
    if !problems.is_empty() {
        return Err(problems);
    }

    Ok(inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| normalize_module(index, input))
        .collect())
}

fn keep_or_generate_id(id: Option<String>) -> String {
    trim_optional_field(id.as_ref()).unwrap_or_else(generate_short_id)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn normalize_module(index: usize, input: ModuleInput) -> Module {
    let lessons = input
        .lessons
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(lesson_index, lesson)| normalize_lesson(lesson_index, lesson))
        .collect();

    Module {
        id: keep_or_generate_id(input.id),
        title: trim_optional_field(input.title.as_ref()).unwrap_or_default(),
        description: trim_optional_field(input.description.as_ref()).unwrap_or_default(),
        duration: trim_optional_field(input.duration.as_ref()).unwrap_or_default(),
        order: index as u32,
        lessons,
    }
}

fn normalize_lesson(index: usize, input: LessonInput) -> Lesson {
    let resources = input
        .resources
        .unwrap_or_default()
        .into_iter()
        .map(|resource| normalize_resource(index, resource))
        .collect();

    Lesson {
        id: keep_or_generate_id(input.id),
        title: trim_optional_field(input.title.as_ref())
            .unwrap_or_else(|| format!("Lesson {}", index + 1)),
        lesson_type: trim_optional_field(input.lesson_type.as_ref())
            .unwrap_or_else(|| DEFAULT_LESSON_TYPE.to_string()),
        duration: trim_optional_field(input.duration.as_ref())
            .unwrap_or_else(|| DEFAULT_LESSON_DURATION.to_string()),
        order: index as u32,
        // Only the first lesson of a module is open by default
        locked: input.locked.unwrap_or(index > 0),
        completed: input.completed.unwrap_or(false),
        video_url: non_empty(input.video_url),
        content: non_empty(input.content),
        transcript: non_empty(input.transcript),
        resources,
    }
}

// Default titles are numbered by the parent lesson's position, not the resource's.
// Dashboards already display this numbering.
fn normalize_resource(lesson_index: usize, input: ResourceInput) -> Resource {
    Resource {
        id: keep_or_generate_id(input.id),
        title: trim_optional_field(input.title.as_ref())
            .unwrap_or_else(|| format!("Resource {}", lesson_index + 1)),
        resource_type: trim_optional_field(input.resource_type.as_ref())
            .unwrap_or_else(|| DEFAULT_RESOURCE_TYPE.to_string()),
        url: input.url.unwrap_or_default(),
        downloadable: input.downloadable.unwrap_or(false),
    }
}
