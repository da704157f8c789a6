//! Minimal owned document tree that emitters produce and its serializer.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;

const INDENT_SIZE: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Element that holds text only like `<ProjectGuid>{...}</ProjectGuid>`
    #[must_use]
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).text(text)
    }

    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends child and returns it for further filling
    pub fn push(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    #[must_use]
    pub fn inner_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child with the name specified
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the name specified
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Depth first iteration over the element and all its descendants
    pub fn descendants(&self) -> Box<dyn Iterator<Item = &Element> + '_> {
        Box::new(std::iter::once(self).chain(self.children.iter().flat_map(Element::descendants)))
    }
}

/// Serializes document with XML declaration and indentation
pub fn write<W: Write>(root: &Element, out: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', INDENT_SIZE);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_element(&mut writer, root)?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

/// Serializes document into string
pub fn to_string(root: &Element) -> Result<String> {
    let mut buffer = Vec::new();
    write(root, &mut buffer)?;
    // Writer gets only &str input so the buffer is always valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &element.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_string_nested_document() {
        // Arrange
        let root = Element::new("Project")
            .attr("ToolsVersion", "4.0")
            .child(Element::new("ItemGroup").child(Element::new("None").attr("Include", "a.txt")))
            .child(Element::with_text("ProjectGuid", "{X}"));

        // Act
        let actual = to_string(&root).unwrap();

        // Assert
        assert_eq!(
            actual,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <Project ToolsVersion=\"4.0\">\n\
             \x20 <ItemGroup>\n\
             \x20   <None Include=\"a.txt\"/>\n\
             \x20 </ItemGroup>\n\
             \x20 <ProjectGuid>{X}</ProjectGuid>\n\
             </Project>\n"
        );
    }

    #[test]
    fn to_string_escapes_attributes_and_text() {
        // Arrange
        let root = Element::new("Tool")
            .attr("BuildCommandLine", "a && b \"c\"")
            .child(Element::with_text("Cmd", "x < y"));

        // Act
        let actual = to_string(&root).unwrap();

        // Assert
        assert!(actual.contains("BuildCommandLine=\"a &amp;&amp; b &quot;c&quot;\""));
        assert!(actual.contains("<Cmd>x &lt; y</Cmd>"));
    }

    #[test]
    fn push_returns_appended_child() {
        // Arrange
        let mut root = Element::new("Files");

        // Act
        root.push(Element::new("Filter").attr("Name", "src"))
            .push(Element::new("File").attr("RelativePath", "a.c"));

        // Assert
        let filter = root.find("Filter").unwrap();
        assert_eq!(filter.attribute("Name"), Some("src"));
        assert_eq!(filter.children().len(), 1);
        assert_eq!(root.descendants().count(), 3);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_io_error() {
        // Arrange
        let root = Element::new("Project").child(Element::new("ItemGroup"));

        // Act
        let actual = write(&root, FailingWriter);

        // Assert
        assert!(matches!(
            actual,
            Err(crate::error::Error::Io(e)) if e.kind() == std::io::ErrorKind::WriteZero
        ));
    }
}
