//! XML output of entity graphs.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::convert::Convert;
use crate::error::Result;
use crate::namespace;

pub use crate::namespace::NamespaceDict;

/// Declaration written before the root element of XML files.
pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>\n";

/// Options for [`Convert::to_xml_with`].
#[derive(Debug, Clone)]
pub struct XmlOptions {
    /// Declare every namespace of the graph on the root element.
    pub include_namespaces: bool,
    /// Extra URI to prefix declarations merged into the namespace block.
    pub namespace_dict: Option<NamespaceDict>,
    /// With `false`, the namespace block is written on the root element's
    /// line instead of one declaration per line.
    pub pretty: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            include_namespaces: true,
            namespace_dict: None,
            pretty: true,
        }
    }
}

impl XmlOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }

    pub fn without_namespaces() -> Self {
        Self {
            include_namespaces: false,
            ..Self::default()
        }
    }

    pub fn with_namespace_dict(mut self, namespace_dict: NamespaceDict) -> Self {
        self.namespace_dict = Some(namespace_dict);
        self
    }
}

pub(crate) fn render<T: Convert>(value: &T, options: &XmlOptions) -> Result<String> {
    let mut namespace_def = if options.include_namespaces {
        namespace::namespace_def(value, options.namespace_dict.as_ref())
    } else {
        String::new()
    };
    if !options.pretty {
        namespace_def = namespace_def.replace("\n\t", " ");
    }

    // Element layout is always indented; `pretty` only shapes the namespace block.
    Ok(value.to_obj().to_xml_string(&namespace_def, true)?)
}

pub(crate) fn write_file<T: Convert>(
    value: &T,
    path: &Path,
    namespace_dict: Option<&NamespaceDict>,
) -> Result<()> {
    let namespace_def = namespace::namespace_def(value, namespace_dict);

    let mut buffer = XML_DECLARATION.as_bytes().to_vec();
    value.to_obj().export(&mut buffer, 0, &namespace_def, true)?;
    fs::write(path, &buffer)?;

    debug!(path = %path.display(), bytes = buffer.len(), "wrote XML document");
    Ok(())
}
