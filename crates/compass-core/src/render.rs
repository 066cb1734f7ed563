//! HTTP response rendering for the compass page
//!
//! The page is a fixed skeleton with four substitution points: the needle
//! rotation, the direction label, and the two axis percentages. Output goes
//! into a fixed-capacity [`heapless::String`], so the response size is
//! bounded at compile time and rendering never touches the heap.

use core::fmt::Write;

use thiserror_no_std::Error;

use crate::config::{Locale, PageConfig};
use crate::direction::DirectionResult;
use crate::sensors::SensorSample;

/// Capacity of the rendered HTML body
pub const BODY_CAPACITY: usize = 3584;
/// Capacity of the status line and headers
pub const HEADER_CAPACITY: usize = 256;
/// Upper bound on a complete response
pub const RESPONSE_CAPACITY: usize = 4096;

const _: () = assert!(BODY_CAPACITY + HEADER_CAPACITY <= RESPONSE_CAPACITY);

pub type ResponseDocument = heapless::String<RESPONSE_CAPACITY>;
type Body = heapless::String<BODY_CAPACITY>;

/// Sent when no request buffer could be allocated
pub const SERVICE_UNAVAILABLE: &[u8] = b"HTTP/1.1 503 Service Unavailable\r\n\
Content-Type: text/plain\r\n\
Content-Length: 20\r\n\
\r\n\
Service Unavailable\n";

/// Sent when the page does not fit its buffer
pub const INTERNAL_SERVER_ERROR: &[u8] = b"HTTP/1.1 500 Internal Server Error\r\n\
Content-Type: text/plain\r\n\
Content-Length: 22\r\n\
\r\n\
Internal Server Error\n";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    #[error("Rendered {section} exceeds its {capacity} byte buffer")]
    Overflow {
        section: &'static str,
        capacity: usize,
    },
}

// Everything up to the rotation value of the needle transform.
const STYLE_HEAD: &str = "<style>\n\
body { font-family: Arial, sans-serif; text-align: center; margin-top: 50px; }\n\
h1 { font-size: 48px; margin-bottom: 20px; }\n\
p { font-size: 28px; }\n\
.compass {\n  position: relative;\n  width: 200px;\n  height: 200px;\n  \
border: 8px solid #333;\n  border-radius: 50%;\n  margin: 40px auto;\n  background: white;\n}\n\
.needle {\n  position: absolute;\n  top: 50%;\n  left: 50%;\n  width: 4px;\n  height: 90px;\n  \
background: red;\n  transform: translate(-50%, -100%) rotate(";

// Everything after the rotation value, through the page heading.
const STYLE_TAIL: &str = "deg);\n  transform-origin: 50% 100%;\n  \
transition: transform 0.3s ease-in-out;\n}\n\
.direction-label {\n  font-weight: bold;\n  font-size: 32px;\n  margin: 10px;\n}\n\
</style>\n</head>\n<body>\n<h1>Joystick</h1>\n";

const PAGE_FOOT: &str = "<div class=\"compass\">\n  <div class=\"needle\"></div>\n</div>\n\
</body>\n</html>\n";

/// Lead-in text of the direction line
const fn pointing_label(locale: Locale) -> &'static str {
    match locale {
        Locale::English => "You are pointing: ",
        Locale::PortugueseBrazil => "Você está apontando para: ",
    }
}

fn overflow(section: &'static str, capacity: usize) -> impl FnOnce(core::fmt::Error) -> RenderError {
    move |_| RenderError::Overflow { section, capacity }
}

fn render_body(
    sample: &SensorSample,
    direction: &DirectionResult,
    page: &PageConfig,
) -> Result<Body, RenderError> {
    let mut body = Body::new();
    write!(
        body,
        "<!DOCTYPE html>\n\
         <html lang=\"{lang}\">\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         <title>Joystick Read</title>\n\
         {style_head}{rotation}{style_tail}\
         <p class=\"direction-label\">{pointing}<strong>{name}</strong></p>\n\
         <p>Position X: {pct_x} %</p>\n\
         <p>Position Y: {pct_y} %</p>\n\
         {foot}",
        lang = page.locale.tag(),
        style_head = STYLE_HEAD,
        rotation = direction.rotation_degrees(),
        style_tail = STYLE_TAIL,
        pointing = pointing_label(page.locale),
        name = direction.direction.label(page.locale),
        pct_x = sample.pct_x,
        pct_y = sample.pct_y,
        foot = PAGE_FOOT,
    )
    .map_err(overflow("body", BODY_CAPACITY))?;
    Ok(body)
}

/// Render the full HTTP response for one reading.
pub fn render(
    sample: &SensorSample,
    direction: &DirectionResult,
    page: &PageConfig,
) -> Result<ResponseDocument, RenderError> {
    let body = render_body(sample, direction, page)?;

    let mut doc = ResponseDocument::new();
    write!(
        doc,
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/html; charset=UTF-8\r\n\
         Content-Length: {}\r\n\
         \r\n",
        body.len()
    )
    .map_err(overflow("header", HEADER_CAPACITY))?;

    doc.push_str(&body)
        .map_err(|_| RenderError::Overflow {
            section: "response",
            capacity: RESPONSE_CAPACITY,
        })?;
    Ok(doc)
}
