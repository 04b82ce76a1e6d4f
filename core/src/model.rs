//! The parsed command-line data model.
//!
//! This module defines the types the parser produces and renderers consume:
//! [`Command`] (one invocation level of an executable), its [`Flag`]s and
//! [`Positional`]s, the [`FlagArg`] shape of a flag's values, and the
//! deduplication and merging algorithms applied when several parses of the
//! same text are reconciled. All types round-trip through serde; the
//! subcommand tree is owned, and no parent back-pointers are stored, so
//! serialization always terminates.

use serde::{Deserialize, Serialize};

use crate::infer::infer_type;
use crate::types::CliType;

/// The shape of the value(s) a flag accepts, as written in help text.
///
/// # Examples
///
/// ```
/// use cli_model_core::FlagArg;
///
/// // `-A INT`
/// let arg = FlagArg::Simple { name: "INT".into() };
/// assert_eq!(arg.num_args(), 1);
///
/// // `-O INT[,INT]`
/// let arg = FlagArg::Optional { names: vec!["INT".into(), "INT".into()], separator: ",".into() };
/// assert_eq!(arg.num_args(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FlagArg {
    /// The flag takes no argument; its presence is the value.
    #[default]
    Empty,
    /// Exactly one argument with a placeholder name, e.g. `-e PATTERN`.
    Simple { name: String },
    /// A progressively-optional argument list, e.g. `-I FLOAT[,FLOAT[,INT]]`.
    Optional { names: Vec<String>, separator: String },
    /// One or more repeated arguments, e.g. `--samout SAMOUTS [SAMOUTS ...]`.
    Repeat { name: String },
    /// One of a fixed set of literal choices, e.g. `--format {sam,bam}`.
    Choice { choices: Vec<String> },
}

impl FlagArg {
    /// The number of distinct argument slots this shape describes: 0 for
    /// [`Empty`](FlagArg::Empty), 1 for simple/repeat/choice, and the name
    /// count for the progressively-optional form.
    pub fn num_args(&self) -> usize {
        match self {
            FlagArg::Empty => 0,
            FlagArg::Simple { .. } | FlagArg::Repeat { .. } | FlagArg::Choice { .. } => 1,
            FlagArg::Optional { names, .. } => names.len(),
        }
    }

    /// The placeholder text of the argument(s), for naming purposes.
    pub fn text(&self) -> Vec<&str> {
        match self {
            FlagArg::Empty => Vec::new(),
            FlagArg::Simple { name } | FlagArg::Repeat { name } => vec![name.as_str()],
            FlagArg::Optional { names, .. } => names.iter().map(String::as_str).collect(),
            FlagArg::Choice { choices } => choices.iter().map(String::as_str).collect(),
        }
    }

    /// The semantic type implied by this shape alone, or `None` when the
    /// placeholder name carries no signal.
    pub fn get_type(&self) -> Option<CliType> {
        match self {
            FlagArg::Empty => Some(CliType::Boolean),
            FlagArg::Simple { name } => infer_type(name),
            FlagArg::Repeat { name } => Some(CliType::List {
                value: Box::new(infer_type(name).unwrap_or_default()),
            }),
            FlagArg::Optional { names, .. } => Some(CliType::Tuple {
                values: names
                    .iter()
                    .map(|name| infer_type(name).unwrap_or_default())
                    .collect(),
            }),
            FlagArg::Choice { choices } => Some(CliType::Enum {
                values: choices.clone(),
            }),
        }
    }
}

/// One spelling of a flag together with the argument shape written next to
/// it, e.g. the `--lines=NUM` half of `-n, --lines=NUM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSynonym {
    /// The full flag string including dashes, e.g. `"-n"` or `"--lines"`.
    pub name: String,
    /// The argument shape attached to this particular spelling.
    pub argtype: FlagArg,
}

/// The narrow interface renderers use to consume an argument, whether named
/// or positional.
pub trait CliArgument {
    /// A human-readable identifier: the positional's name, or the flag's
    /// longest synonym.
    fn full_name(&self) -> &str;

    /// The inferred semantic type of the value this argument holds.
    fn get_type(&self) -> CliType;

    /// The help-text description, possibly empty.
    fn description(&self) -> &str;

    /// Whether this argument may be omitted.
    fn optional(&self) -> bool;

    /// Lowercased words to build a variable name from.
    fn argument_name(&self) -> Vec<String> {
        name_words(self.full_name())
    }
}

fn name_words(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

/// A positional command-line argument: no dash prefix, identified by its
/// position in the invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Positional {
    /// Zero-based position within one command invocation.
    pub position: usize,
    /// The placeholder name, e.g. `out.bam`.
    pub name: String,
    /// Description from the help text.
    pub description: String,
    /// True when the usage section marked this argument optional.
    pub optional: bool,
}

impl Positional {
    pub fn new(position: usize, name: &str, description: &str) -> Self {
        Self {
            position,
            name: name.to_string(),
            description: description.to_string(),
            optional: false,
        }
    }

    /// Merges duplicate positionals that share a name.
    ///
    /// Within a group the first position wins, the longest description wins,
    /// and the argument is optional if it was optional in *any* occurrence.
    /// The result is ordered by position.
    pub fn deduplicate(positionals: Vec<Positional>) -> Vec<Positional> {
        let mut groups: Vec<(String, Vec<Positional>)> = Vec::new();
        for positional in positionals {
            match groups.iter_mut().find(|(name, _)| *name == positional.name) {
                Some((_, group)) => group.push(positional),
                None => groups.push((positional.name.clone(), vec![positional])),
            }
        }

        let mut merged: Vec<Positional> = groups
            .into_iter()
            .map(|(_, group)| Positional::merge(group))
            .collect();
        merged.sort_by_key(|positional| positional.position);
        merged
    }

    /// Combines the information in a group of positionals with the same name.
    pub fn merge(group: Vec<Positional>) -> Positional {
        let position = group.first().map_or(0, |positional| positional.position);
        let name = group
            .iter()
            .find(|positional| !positional.name.is_empty())
            .map_or(String::new(), |positional| positional.name.clone());
        let optional = group.iter().any(|positional| positional.optional);
        let description = group
            .into_iter()
            .map(|positional| positional.description)
            .max_by_key(String::len)
            .unwrap_or_default();
        Positional {
            position,
            name,
            description,
            optional,
        }
    }
}

impl CliArgument for Positional {
    fn full_name(&self) -> &str {
        &self.name
    }

    /// Tries the argument name first, then falls back to [`CliType::String`].
    fn get_type(&self) -> CliType {
        infer_type(&self.name).unwrap_or_default()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn optional(&self) -> bool {
        self.optional
    }
}

/// A named command-line option with all of its synonyms, e.g. `-h, --help`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    /// The distinct spellings of this flag, in the order they appeared.
    pub synonyms: Vec<String>,
    /// Description from the help text, possibly spanning multiple joined lines.
    pub description: String,
    /// The shape of the value(s) this flag accepts.
    pub args: FlagArg,
    /// Flags are optional unless the usage section proves otherwise.
    pub optional: bool,
}

impl Flag {
    pub fn new(synonyms: Vec<String>, description: &str, args: FlagArg) -> Self {
        Self {
            synonyms,
            description: description.to_string(),
            args,
            optional: true,
        }
    }

    /// Builds a flag from parsed synonyms. All spellings share one argument
    /// shape: the one with the greatest [`FlagArg::num_args`], first seen
    /// winning ties.
    pub fn from_synonyms(synonyms: Vec<FlagSynonym>, description: &str) -> Self {
        let mut names = Vec::with_capacity(synonyms.len());
        let mut args = FlagArg::Empty;
        let mut best: Option<usize> = None;

        for synonym in synonyms {
            let count = synonym.argtype.num_args();
            if best.is_none_or(|prev| count > prev) {
                best = Some(count);
                args = synonym.argtype;
            }
            names.push(synonym.name);
        }

        Flag::new(names, description, args)
    }

    /// The longest synonym, e.g. `--help` out of `-h, --help`.
    pub fn longest_synonym(&self) -> &str {
        self.synonyms
            .iter()
            .max_by_key(|synonym| synonym.len())
            .map_or("", String::as_str)
    }

    /// The shortest synonym, e.g. `-h` out of `-h, --help`.
    pub fn shortest_synonym(&self) -> &str {
        self.synonyms
            .iter()
            .min_by_key(|synonym| synonym.len())
            .map_or("", String::as_str)
    }

    /// True if any synonym matches `name` exactly.
    pub fn has_synonym(&self, name: &str) -> bool {
        self.synonyms.iter().any(|synonym| synonym == name)
    }

    /// Clusters flags that share any synonym and merges each cluster.
    ///
    /// Clustering is transitive: `-v`/`--verbose` and `--verbose`/`-V` end up
    /// in one cluster. Output preserves first-seen order, and merging an
    /// already-merged list is a no-op.
    pub fn deduplicate(flags: Vec<Flag>) -> Vec<Flag> {
        let mut todo = flags;
        let mut clusters: Vec<Vec<Flag>> = Vec::new();

        while !todo.is_empty() {
            let seed = todo.remove(0);
            let mut synonyms: Vec<String> = seed.synonyms.clone();
            let mut cluster = vec![seed];

            // Absorb until fixpoint so transitive overlaps join one cluster.
            loop {
                let before = todo.len();
                let mut index = 0;
                while index < todo.len() {
                    if todo[index]
                        .synonyms
                        .iter()
                        .any(|synonym| synonyms.contains(synonym))
                    {
                        let flag = todo.remove(index);
                        for synonym in &flag.synonyms {
                            if !synonyms.contains(synonym) {
                                synonyms.push(synonym.clone());
                            }
                        }
                        cluster.push(flag);
                    } else {
                        index += 1;
                    }
                }
                if todo.len() == before {
                    break;
                }
            }

            clusters.push(cluster);
        }

        clusters.into_iter().map(Flag::merge).collect()
    }

    /// Combines the information in a cluster of flags describing the same
    /// option: union of synonyms, longest description, first non-trivial
    /// argument shape, optional if optional anywhere.
    pub fn merge(cluster: Vec<Flag>) -> Flag {
        let mut synonyms: Vec<String> = Vec::new();
        for flag in &cluster {
            for synonym in &flag.synonyms {
                if !synonyms.contains(synonym) {
                    synonyms.push(synonym.clone());
                }
            }
        }
        let optional = cluster.iter().any(|flag| flag.optional);
        let args = cluster
            .iter()
            .find(|flag| flag.args != FlagArg::Empty)
            .map_or(FlagArg::Empty, |flag| flag.args.clone());
        let description = cluster
            .into_iter()
            .map(|flag| flag.description)
            .max_by_key(String::len)
            .unwrap_or_default();
        Flag {
            synonyms,
            description,
            args,
            optional,
        }
    }

    /// Combines flags from several sources, choosing the first source's
    /// entry whenever a (dash-stripped) synonym is claimed twice, then
    /// dropping later flags whose longest synonym was already emitted.
    pub fn combine<I>(sources: I) -> Vec<Flag>
    where
        I: IntoIterator<Item = Vec<Flag>>,
    {
        let mut claimed: Vec<String> = Vec::new();
        let mut chosen: Vec<Flag> = Vec::new();

        for source in sources {
            for flag in source {
                let mut new_synonym = false;
                for synonym in &flag.synonyms {
                    let stripped = synonym.trim_start_matches('-').to_string();
                    if !claimed.contains(&stripped) {
                        claimed.push(stripped);
                        new_synonym = true;
                    }
                }
                if new_synonym {
                    chosen.push(flag);
                }
            }
        }

        let mut seen_longest: Vec<String> = Vec::new();
        chosen.retain(|flag| {
            let longest = flag.longest_synonym().to_string();
            if seen_longest.contains(&longest) {
                false
            } else {
                seen_longest.push(longest);
                true
            }
        });
        chosen
    }
}

impl CliArgument for Flag {
    fn full_name(&self) -> &str {
        self.longest_synonym()
    }

    /// Infers the type from three fallback signals: the argument shape, the
    /// longest synonym text, then the description. Among the signals that
    /// produced a type, non-strings beat strings and output filesystem types
    /// beat everything else; earlier signals win remaining ties.
    fn get_type(&self) -> CliType {
        let candidates = [
            self.args.get_type(),
            infer_type(self.full_name()),
            infer_type(&self.description),
        ];

        let mut best: Option<CliType> = None;
        let mut best_rank = (false, false);
        for candidate in candidates.into_iter().flatten() {
            let rank = (
                !matches!(candidate, CliType::String),
                candidate.is_output(),
            );
            if best.is_none() || rank > best_rank {
                best_rank = rank;
                best = Some(candidate);
            }
        }
        best.unwrap_or_default()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn optional(&self) -> bool {
        self.optional
    }
}

/// One level of a command-line invocation, e.g. `bwa` or `bwa mem`, with
/// everything the parser learned about it.
///
/// Subcommands are owned; there is no parent back-pointer, so a command tree
/// serializes without cycles. Depth within a tree is computed by walking from
/// the root ([`Command::depth_of`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Command {
    /// The tokens used to invoke this command, e.g. `["bwa", "mem"]`.
    pub command: Vec<String>,
    /// Positional arguments, ordered by position.
    pub positional: Vec<Positional>,
    /// Named arguments (flags), excluding the extracted special flags.
    pub named: Vec<Flag>,
    /// Subcommands, e.g. `bwa mem` under `bwa`.
    pub subcommands: Vec<Command>,
    /// The flag that prints help text, if one was recognized.
    pub help_flag: Option<Flag>,
    /// The flag that prints usage examples, if one was recognized.
    pub usage_flag: Option<Flag>,
    /// The flag that prints the version, if one was recognized.
    pub version_flag: Option<Flag>,
    /// The raw help text this command was parsed from.
    pub help_text: Option<String>,
    /// The help flag used to capture that text, e.g. `"--help"`.
    pub generated_using: Option<String>,
    /// A container image this command is known to run in.
    pub docker_image: Option<String>,
}

impl Command {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            ..Default::default()
        }
    }

    /// True when parsing found nothing at all, which downstream exploration
    /// treats as "this help flag didn't work, try another".
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty() && self.subcommands.is_empty()
    }

    /// Moves the canonical help/usage/version flags out of [`named`] into
    /// their dedicated fields. Each field is populated at most once, and a
    /// flag leaves `named` exactly once.
    ///
    /// [`named`]: Command::named
    pub fn extract_special_flags(&mut self) {
        if self.help_flag.is_none() {
            if let Some(index) = self.named.iter().position(|flag| {
                flag.has_synonym("--help")
                    || flag.has_synonym("-help")
                    || (flag.has_synonym("-h") && flag.args == FlagArg::Empty)
            }) {
                self.help_flag = Some(self.named.remove(index));
            }
        }

        if self.version_flag.is_none() {
            if let Some(index) = self
                .named
                .iter()
                .position(|flag| flag.has_synonym("--version"))
            {
                self.version_flag = Some(self.named.remove(index));
            }
        }

        if self.usage_flag.is_none() {
            if let Some(index) = self
                .named
                .iter()
                .position(|flag| flag.has_synonym("--usage"))
            {
                self.usage_flag = Some(self.named.remove(index));
            }
        }
    }

    /// Finds a direct subcommand whose path is this command's path plus
    /// `name`.
    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|sub| {
            sub.command.len() == self.command.len() + 1
                && sub.command.last().map(String::as_str) == Some(name)
        })
    }

    /// Every command in the tree rooted here, depth-first, self included.
    pub fn command_tree(&self) -> Vec<&Command> {
        let mut nodes = vec![self];
        for sub in &self.subcommands {
            nodes.extend(sub.command_tree());
        }
        nodes
    }

    /// The number of ancestors `descendant` has below `self`, or `None` when
    /// it is not in this tree. The root itself has depth 0.
    pub fn depth_of(&self, descendant: &Command) -> Option<usize> {
        if self.command == descendant.command {
            return Some(0);
        }
        for sub in &self.subcommands {
            if let Some(depth) = sub.depth_of(descendant) {
                return Some(depth + 1);
            }
        }
        None
    }

    /// Picks the best of several parses of the same executable: the one with
    /// the most named plus positional arguments.
    pub fn best(candidates: Vec<Command>) -> Option<Command> {
        candidates
            .into_iter()
            .max_by_key(|command| command.named.len() + command.positional.len())
    }

    /// All flag synonyms across [`named`](Command::named).
    pub fn all_synonyms(&self) -> Vec<&str> {
        self.named
            .iter()
            .flat_map(|flag| flag.synonyms.iter().map(String::as_str))
            .collect()
    }

    /// A filesystem-safe name for storing this command, e.g. `bwa_mem`.
    pub fn as_filename(&self) -> String {
        self.command.join("_").replace('-', "_")
    }

    /// Arguments (named or positional) whose type marks them as outputs of
    /// the command rather than inputs.
    pub fn outputs(&self) -> Vec<&dyn CliArgument> {
        let mut ret: Vec<&dyn CliArgument> = Vec::new();
        for flag in &self.named {
            if flag.get_type().is_output() {
                ret.push(flag);
            }
        }
        for positional in &self.positional {
            if positional.get_type().is_output() {
                ret.push(positional);
            }
        }
        ret
    }
}
