//! Drives an [`Extractor`] from html5ever's tokenizer.
//!
//! Only the tokenizer is used, not the tree builder: the extractor does its
//! own (much more forgiving) tree construction. Consecutive character
//! tokens are joined so the extractor sees one text event per run of text,
//! with character references already resolved.

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use html5ever::interface::TokenizerResult;

use super::Extractor;
use super::sink::DocumentSink;
use crate::element::Attributes;

/// TokenSink forwarding tokens to the extractor.
///
/// Uses interior mutability (RefCell) because html5ever's TokenSink trait
/// takes `&self`.
struct EventSink<'a, S: DocumentSink> {
    extractor: RefCell<&'a mut Extractor<S>>,
    text: RefCell<String>,
}

impl<S: DocumentSink> EventSink<'_, S> {
    fn flush_text(&self) {
        let mut text = self.text.borrow_mut();
        if !text.is_empty() {
            self.extractor.borrow_mut().text(&text);
            text.clear();
        }
    }
}

impl<S: DocumentSink> TokenSink for EventSink<'_, S> {
    type Handle = ();

    fn process_token(&self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => {
                self.text.borrow_mut().push_str(&text);
            }
            Token::TagToken(tag) => {
                self.flush_text();
                let mut extractor = self.extractor.borrow_mut();
                extractor.set_line(line_number);
                let name: &str = &tag.name;
                match tag.kind {
                    TagKind::StartTag => {
                        let attrs: Attributes = tag
                            .attrs
                            .iter()
                            .map(|a| (a.name.local.to_string(), a.value.to_string()))
                            .collect();
                        extractor.start_tag(name, attrs);
                        if tag.self_closing {
                            extractor.end_tag(name);
                        } else {
                            match name {
                                "script" => return TokenSinkResult::RawData(RawKind::ScriptData),
                                "style" => return TokenSinkResult::RawData(RawKind::Rawtext),
                                _ => {}
                            }
                        }
                    }
                    TagKind::EndTag => extractor.end_tag(name),
                }
            }
            Token::EOFToken => self.flush_text(),
            Token::ParseError(msg) => {
                log::trace!(target: "bookweave::tokenizer", "line {line_number}: {msg}");
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }

    fn end(&self) {
        self.flush_text();
    }
}

/// Tokenize a whole document and feed the events to `extractor`.
pub(crate) fn feed_html<S: DocumentSink>(extractor: &mut Extractor<S>, html: &str) {
    let sink = EventSink {
        extractor: RefCell::new(extractor),
        text: RefCell::new(String::new()),
    };
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));
    match tokenizer.feed(&input) {
        TokenizerResult::Done => {}
        // only returned after TokenSinkResult::Script, which EventSink never yields
        TokenizerResult::Script(()) => log::debug!("tokenizer paused on a script"),
        // only returned after TokenSinkResult::EncodingIndicator, which EventSink never yields
        TokenizerResult::EncodingIndicator(_) => {
            log::debug!("tokenizer paused on an encoding indicator")
        }
    }
    tokenizer.end();
}
