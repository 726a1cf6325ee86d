//! Parsing MAEC documents into binding trees and entity graphs.

use std::path::Path;

use maec_binding::{BindingObject, ParsedDocument, read};
use tracing::debug;

use crate::convert::Convert;
use crate::entity::{Entity, short_type_name};
use crate::error::{EntityError, Result};
use crate::xml::{NamespaceDict, XmlOptions};

/// Root attribute holding a document's schema version.
pub const SCHEMA_VERSION_ATTRIBUTE: &str = "schema_version";

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Reject documents whose root declares a schema version other than the
    /// root type's.
    pub check_version: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            check_version: true,
        }
    }
}

/// A parsed document in both of its forms.
#[derive(Debug, Clone)]
pub struct ParsedInstance<E> {
    /// Binding tree read from the document.
    pub binding: BindingObject,
    /// Entity graph rebuilt from the binding tree.
    pub api: E,
    /// Namespace declarations found in the document, URI to prefix.
    pub input_namespaces: NamespaceDict,
}

/// Parses a MAEC document from `path` into its binding tree and an `E`.
pub fn parse_xml_instance<E: Entity>(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<ParsedInstance<E>> {
    let document = read::from_xml_file(path)?;
    build_instance(document, options)
}

/// Same as [`parse_xml_instance`] for a document held in memory.
pub fn parse_xml_str<E: Entity>(xml: &str, options: &ParseOptions) -> Result<ParsedInstance<E>> {
    let document = read::from_xml_str(xml)?;
    build_instance(document, options)
}

fn build_instance<E: Entity>(
    document: ParsedDocument,
    options: &ParseOptions,
) -> Result<ParsedInstance<E>> {
    let ParsedDocument { root, namespaces } = document;

    if options.check_version {
        check_version::<E>(&root)?;
    }

    let api = E::from_obj(Some(&root))?.unwrap_or_default();

    let mut input_namespaces = NamespaceDict::new();
    for (uri, prefix) in namespaces {
        input_namespaces.entry(uri).or_insert(prefix);
    }

    debug!(
        root = %root.qualified_name(),
        entity = short_type_name::<E>(),
        namespaces = input_namespaces.len(),
        "parsed document"
    );

    Ok(ParsedInstance {
        binding: root,
        api,
        input_namespaces,
    })
}

fn check_version<E: Entity>(root: &BindingObject) -> Result<()> {
    let Some(expected) = E::SCHEMA_VERSION else {
        return Ok(());
    };

    let found = root.attribute(SCHEMA_VERSION_ATTRIBUTE);
    if found == Some(expected) {
        return Ok(());
    }
    Err(EntityError::UnsupportedVersion {
        entity: short_type_name::<E>(),
        expected,
        found: found.map(str::to_string),
    })
}

impl<E: Entity> ParsedInstance<E> {
    /// Caller declarations overlaid with the document's own.
    fn merged_namespaces(&self, namespace_dict: Option<&NamespaceDict>) -> NamespaceDict {
        let mut merged = namespace_dict.cloned().unwrap_or_default();
        merged.extend(
            self.input_namespaces
                .iter()
                .map(|(uri, prefix)| (uri.clone(), prefix.clone())),
        );
        merged
    }

    /// XML text of the entity graph, re-declaring the document's namespaces.
    pub fn to_xml(&self) -> Result<String> {
        self.to_xml_with(&XmlOptions::default())
    }

    pub fn to_xml_with(&self, options: &XmlOptions) -> Result<String> {
        let options = XmlOptions {
            namespace_dict: Some(self.merged_namespaces(options.namespace_dict.as_ref())),
            ..options.clone()
        };
        self.api.to_xml_with(&options)
    }

    pub fn to_xml_file(
        &self,
        path: impl AsRef<Path>,
        namespace_dict: Option<&NamespaceDict>,
    ) -> Result<()> {
        let merged = self.merged_namespaces(namespace_dict);
        self.api.to_xml_file(path, Some(&merged))
    }
}
