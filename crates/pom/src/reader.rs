use std::borrow::Cow;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use vman_core::{
    Coordinate, DEFAULT_DEPENDENCY_TYPE, DependencyDeclaration, Descriptor, ReadOptions,
    VmanError, parent_coordinate,
};

use crate::model_path::{Entry, Field, entry_at, field_at};

const DEFAULT_PACKAGING: &str = "jar";
const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";
const PLUGIN_TYPE: &str = "maven-plugin";

#[derive(Debug, Default)]
pub(crate) struct Fields {
    pub(crate) group: Option<String>,
    pub(crate) artifact: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) kind: Option<String>,
    pub(crate) classifier: Option<String>,
    pub(crate) scope: Option<String>,
}

impl Fields {
    fn set(&mut self, name: &str, value: Option<String>) {
        match name {
            "groupId" => self.group = value,
            "artifactId" => self.artifact = value,
            "version" => self.version = value,
            "packaging" | "type" => self.kind = value,
            "classifier" => self.classifier = value,
            "scope" => self.scope = value,
            _ => {}
        }
    }
}

/// Raw element values, before defaults and validation.
#[derive(Debug, Default)]
pub(crate) struct PomModel {
    pub(crate) root: Option<String>,
    pub(crate) project: Fields,
    pub(crate) parent: Option<Fields>,
    pub(crate) entries: Vec<(Entry, Fields)>,
    pub(crate) modules: Vec<String>,
}

/// Parse POM XML into a [`Descriptor`].
///
/// Strict mode requires the root element to be `<project>` and rejects
/// incomplete dependency/plugin entries; lenient mode accepts any root element
/// and skips incomplete entries. Both need an `artifactId` and a group, either
/// declared or inherited from the parent reference.
pub fn read_pom(path: &Path, content: &str, options: ReadOptions) -> Result<Descriptor, VmanError> {
    let model = parse_model(path, content)?;

    if options.strict && model.root.as_deref() != Some("project") {
        return Err(VmanError::parse(
            path,
            format!(
                "Unexpected root element: {}",
                model.root.as_deref().unwrap_or("<none>")
            ),
        ));
    }

    let parent = match &model.parent {
        Some(fields) => match (&fields.group, &fields.artifact) {
            (Some(group), Some(artifact)) => {
                Some(parent_coordinate(group, artifact, fields.version.clone()))
            }
            _ => {
                return Err(VmanError::parse(
                    path,
                    "Parent reference is missing groupId or artifactId",
                ));
            }
        },
        None => None,
    };

    let artifact = model
        .project
        .artifact
        .clone()
        .ok_or_else(|| VmanError::parse(path, "Missing artifactId"))?;
    let group = model
        .project
        .group
        .clone()
        .or_else(|| parent.as_ref().map(|p| p.group().to_string()))
        .ok_or_else(|| VmanError::parse(path, "Missing groupId"))?;
    let packaging = model
        .project
        .kind
        .clone()
        .unwrap_or_else(|| DEFAULT_PACKAGING.to_string());

    let mut descriptor = Descriptor::new(
        path.to_path_buf(),
        Coordinate::new(group, artifact, model.project.version.clone(), packaging),
        parent,
    );

    for (entry, fields) in model.entries {
        let coordinate = match (entry, fields.group, fields.artifact) {
            (Entry::Plugin, group, Some(artifact)) => Coordinate::new(
                group.unwrap_or_else(|| DEFAULT_PLUGIN_GROUP.to_string()),
                artifact,
                fields.version,
                PLUGIN_TYPE,
            ),
            (Entry::Dependency { .. }, Some(group), Some(artifact)) => Coordinate::new(
                group,
                artifact,
                fields.version,
                fields
                    .kind
                    .unwrap_or_else(|| DEFAULT_DEPENDENCY_TYPE.to_string()),
            )
            .with_classifier(fields.classifier),
            _ if options.strict => {
                return Err(VmanError::parse(
                    path,
                    "Dependency or plugin entry is missing groupId or artifactId",
                ));
            }
            _ => continue,
        };
        match entry {
            Entry::Dependency { managed } => descriptor.add_dependency(
                DependencyDeclaration::new(coordinate, managed).with_scope(fields.scope),
            ),
            Entry::Plugin => descriptor.add_plugin(coordinate),
        }
    }

    for module in model.modules {
        descriptor.add_module(module);
    }
    descriptor.set_source(content.to_string());
    Ok(descriptor)
}

pub(crate) fn parse_model(path: &Path, content: &str) -> Result<PomModel, VmanError> {
    let mut reader = Reader::from_str(content);
    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut model = PomModel::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if stack.is_empty() {
                    model.root = Some(name.clone());
                }
                stack.push(name);
                text.clear();

                if stack.len() == 2 && stack[1] == "parent" {
                    model.parent = Some(Fields::default());
                } else if let Some(entry) = entry_at(&stack) {
                    model.entries.push((entry, Fields::default()));
                }
            }
            Ok(Event::Text(e)) => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::GeneralRef(e)) => {
                text.push('&');
                text.push_str(&String::from_utf8_lossy(&e));
                text.push(';');
            }
            Ok(Event::End(_)) => {
                let trimmed = text.trim();
                let value = Some(unescape(trimmed).map_or_else(|_| trimmed.to_string(), Cow::into_owned))
                    .filter(|v| !v.is_empty());
                match field_at(&stack) {
                    Some(Field::Project(name)) => model.project.set(name, value),
                    Some(Field::Parent(name)) => {
                        if let Some(parent) = model.parent.as_mut() {
                            parent.set(name, value);
                        }
                    }
                    Some(Field::Entry(_, name)) => {
                        if let Some((_, fields)) = model.entries.last_mut() {
                            fields.set(name, value);
                        }
                    }
                    Some(Field::Module) => model.modules.extend(value),
                    None => {}
                }
                stack.pop();
                text.clear();
            }
            Ok(Event::Empty(e)) => {
                if stack.is_empty() {
                    model.root = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(VmanError::parse(path, format!("XML parsing error: {e}"))),
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(VmanError::parse(
            path,
            format!("XML parsing error: unclosed element <{open}>"),
        ));
    }
    Ok(model)
}
