//! Fillers: anything that fills one or more placeholders in a [PartialPrompt].
//!
//! A filler implements [FillPlaceholders] plus at least one of [Fill], [FillMut],
//! [FillWith] and [FillWithMut]. Fillers compose: a partial prompt can be passed
//! through several fillers in stages before [PartialPrompt::complete](crate::prompt::PartialPrompt::complete).

use std::collections::HashMap;
use crate::prompt::PartialPrompt;
use anyhow::Result;

pub trait FillPlaceholders {
    fn placeholders_to_fill(&self) -> &Vec<String>;
}

pub trait Fill: FillPlaceholders {
    fn fill(&self, partial_prompt: &mut PartialPrompt) -> Result<()>;
}

pub trait FillMut: FillPlaceholders {
    fn fill_mut(&mut self, partial_prompt: &mut PartialPrompt) -> Result<()>;
}

pub trait FillWith<CTX>: FillPlaceholders {
    fn fill_with(&self, partial_prompt: &mut PartialPrompt, context: CTX) -> Result<CTX>;
}

pub trait FillWithMut<CTX>: FillPlaceholders {
    fn fill_with_mut(&mut self, partial_prompt: &mut PartialPrompt, context: CTX) -> Result<CTX>;
}

impl<T: FillWith<()>> Fill for T {
    fn fill(&self, partial_prompt: &mut PartialPrompt) -> Result<()> {
        self.fill_with(partial_prompt, ())?;
        Ok(())
    }
}

impl<T: FillWithMut<()>> FillMut for T {
    fn fill_mut(&mut self, partial_prompt: &mut PartialPrompt) -> Result<()> {
        self.fill_with_mut(partial_prompt, ())?;
        Ok(())
    }
}

/// The simplest filler: a fixed mapping from placeholder names to values.
pub struct MapFiller {
    values: HashMap<String, String>,
    placeholders: Vec<String>,
}

impl MapFiller {
    pub fn new(values: HashMap<String, String>) -> Self {
        let placeholders = values.keys().cloned().collect();
        Self { values, placeholders }
    }
}

impl FillPlaceholders for MapFiller {
    fn placeholders_to_fill(&self) -> &Vec<String> {
        &self.placeholders
    }
}

impl FillWith<()> for MapFiller {
    fn fill_with(&self, partial_prompt: &mut PartialPrompt, context: ()) -> Result<()> {
        for (placeholder, value) in self.values.iter() {
            partial_prompt.try_fill(placeholder.as_str(), value.as_str())?;
        }
        Ok(context)
    }
}

#[cfg(test)]
mod test_filler {
    use std::collections::HashMap;
    use crate::prompt::PromptTemplate;
    use super::{Fill, MapFiller};

    #[test]
    fn test_map_filler() {
        let template = PromptTemplate::new("{{greeting}}, {{name}}!");
        let mut partial_prompt = template.construct_prompt();
        let filler = MapFiller::new(HashMap::from([
            ("greeting".to_string(), "Hi".to_string()),
            ("name".to_string(), "Ada".to_string()),
        ]));
        filler.fill(&mut partial_prompt).unwrap();
        assert_eq!("Hi, Ada!", partial_prompt.complete().unwrap());
    }

    #[test]
    fn test_map_filler_unknown_placeholder() {
        let template = PromptTemplate::new("{{greeting}}");
        let mut partial_prompt = template.construct_prompt();
        let filler = MapFiller::new(HashMap::from([("name".to_string(), "Ada".to_string())]));
        assert!(filler.fill(&mut partial_prompt).is_err());
    }
}
