use std::env;
use std::error::Error;
use xdom::parser::{DomParser, ParseStatus};
use xdom::{Document, Node};

fn main() -> Result<(), Box<dyn Error>> {
    let file_path = env::args().nth(1).ok_or("Missing file path")?;
    let mut parser = DomParser::new();
    if parser.parse(&file_path, true) != ParseStatus::None {
        return Err(parser.reason().to_string().into());
    }

    let doc = parser.document().ok_or("Missing document")?;
    let elements = doc.get_elements_by_tag_name("*");
    for i in 0..elements.length() {
        if let Some(element) = elements.item(i) {
            dbg!(element.node_name());
        }
    }
    Ok(())
}
