use crate::error::ExtractError;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// The attributes of one `<rate>` element, exactly as they appear in the export.
///
/// Both attributes are optional at this layer so the extractor can report which
/// record is missing what.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRate {
    pub moment: Option<String>,
    pub value: Option<String>,
}

/// Collects every `<rate>` element of the payload, at any nesting depth, in document order.
pub fn parse_rate_elements(payload: &str) -> Result<Vec<RawRate>, ExtractError> {
    let mut reader = Reader::from_str(payload);
    reader.config_mut().trim_text(true);

    let mut rates = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element))
                if element.local_name().as_ref() == b"rate" =>
            {
                let mut raw = RawRate::default();
                for attribute in element.attributes() {
                    let attribute =
                        attribute.map_err(|e| ExtractError::MalformedPayload(e.to_string()))?;
                    let text = attribute
                        .unescape_value()
                        .map_err(|e| ExtractError::MalformedPayload(e.to_string()))?
                        .into_owned();
                    match attribute.key.as_ref() {
                        b"moment" => raw.moment = Some(text),
                        b"value" => raw.value = Some(text),
                        _ => {}
                    }
                }
                rates.push(raw);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::MalformedPayload(format!(
                    "at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(rates)
}
