pub mod parsed;
pub mod request;
pub mod response;
pub mod validate;
pub mod violations;

pub use parsed::{
    OutputParseError, ParsedContentPart, ParsedOutputItem, ParsedResponse, parse_structured,
};
pub use request::{
    GenerationInput, GenerationRequest, InputMessage, MessageRole, OutputFormat, Reasoning,
    ReasoningEffort, ReasoningSummary, TextOptions,
};
pub use response::{ContentPart, GenerationResponse, OutputItem, ReasoningPart};
pub use validate::{RequestValidator, ValidationError, ValidationProfile};
pub use violations::{PathSegment, ViolationTree};
