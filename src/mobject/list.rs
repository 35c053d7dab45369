use crate::mobject::error::{MobjectError, Result};
use crate::mobject::math::{MathTypst, MathTypstOptions, TextMatch};
use crate::mobject::normalize::LINE_BREAK;
use crate::mobject::single::{SingleStringMathTypst, SingleStringOptions};
use crate::scene::{DOWN, LEFT, MED_LARGE_BUFF, ORIGIN, SMALL_BUFF, VMobject};
use crate::typst::{Environment, PathRenderer};

const BULLET: &str = "dot.c";

#[derive(Debug, Clone, PartialEq)]
pub struct BulletedListOptions {
    /// Vertical gap between items.
    pub buff: f32,
    pub dot_scale_factor: f32,
    pub math: MathTypstOptions,
}

impl Default for BulletedListOptions {
    fn default() -> Self {
        let mut math = MathTypstOptions::text_mode();
        math.base.environment = Environment::Text;
        Self {
            buff: MED_LARGE_BUFF,
            dot_scale_factor: 2.0,
            math,
        }
    }
}

/// Which item `fade_all_but` keeps.
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Index(usize),
    /// First item whose text contains this.
    Text(String),
}

impl From<usize> for ListItem {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<String> for ListItem {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ListItem {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// One item per line, each with a bullet in front.
#[derive(Debug, Clone)]
pub struct BulletedList {
    math: MathTypst,
    options: BulletedListOptions,
}

impl BulletedList {
    pub fn new<S: AsRef<str>>(
        items: &[S],
        options: BulletedListOptions,
        renderer: &dyn PathRenderer,
    ) -> Result<Self> {
        let lines: Vec<String> = items
            .iter()
            .map(|item| format!("{} {LINE_BREAK}", item.as_ref()))
            .collect();
        let mut math = MathTypst::new(&lines, options.math.clone(), renderer)?;

        let bullet_options = SingleStringOptions {
            environment: Environment::Math,
            ..options.math.base.clone()
        };
        let line_suffix = format!(" {LINE_BREAK}");

        for part in math.mobject_mut().children.iter_mut() {
            // Addressing works on what the caller wrote, not on the appended line break.
            if let Some(item) = part.source_text().strip_suffix(line_suffix.as_str()) {
                part.source = Some(item.into());
            }

            let mut dot =
                SingleStringMathTypst::new(BULLET, &bullet_options, renderer)?.into_mobject();
            dot.scale(options.dot_scale_factor);
            let target = match part.children.first() {
                Some(first) => first.bounds(),
                None => part.bounds(),
            };
            dot.next_to(target, LEFT, SMALL_BUFF, ORIGIN);
            part.add_to_back(dot);
        }

        math.mobject_mut().arrange(DOWN, LEFT, options.buff);

        Ok(Self { math, options })
    }

    /// Full opacity for the selected item, `opacity` for every other one.
    pub fn fade_all_but(&mut self, item: impl Into<ListItem>, opacity: f32) -> Result<()> {
        let selected = match item.into() {
            ListItem::Index(index) if index < self.math.parts().len() => Some(index),
            ListItem::Index(index) => {
                return Err(MobjectError::InvalidSelector(format!(
                    "item index {index} out of range for a list of {}",
                    self.math.parts().len()
                )));
            }
            ListItem::Text(text) => self.math.index_of_part_by_text(&text, TextMatch::default()).ok(),
        };

        for (i, part) in self.math.mobject_mut().children.iter_mut().enumerate() {
            let fill = if Some(i) == selected { 1.0 } else { opacity };
            part.set_fill(None, Some(fill));
        }
        Ok(())
    }

    pub fn math(&self) -> &MathTypst {
        &self.math
    }

    pub fn math_mut(&mut self) -> &mut MathTypst {
        &mut self.math
    }

    pub fn options(&self) -> &BulletedListOptions {
        &self.options
    }

    pub fn items(&self) -> &[VMobject] {
        self.math.parts()
    }

    pub fn into_mobject(self) -> VMobject {
        self.math.into_mobject()
    }
}
