//! Default named strategies.

use anonymizer_core::FieldValue;
use anonymizer_core::value::{parse_date, parse_datetime};
use anonymizer_generate::FakerKind;

use crate::errors::PolicyError;
use crate::replacer::{ParamUse, ReplaceArgs, ReplaceContext, ReplacerRegistry, Strategy};

type StrategyFn =
    fn(&mut ReplaceContext<'_>, &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError>;

#[derive(Clone, Copy)]
struct FnStrategy {
    id: &'static str,
    param: ParamUse,
    summary: &'static str,
    replace: StrategyFn,
}

impl Strategy for FnStrategy {
    fn id(&self) -> &'static str {
        self.id
    }

    fn param(&self) -> ParamUse {
        self.param
    }

    fn summary(&self) -> &'static str {
        self.summary
    }

    fn replace(
        &self,
        ctx: &mut ReplaceContext<'_>,
        args: &ReplaceArgs<'_>,
    ) -> Result<FieldValue, PolicyError> {
        (self.replace)(ctx, args)
    }
}

/// Realistic text drawn from the faker locale.
struct FakerStrategy {
    kind: FakerKind,
}

impl Strategy for FakerStrategy {
    fn id(&self) -> &'static str {
        self.kind.id()
    }

    fn summary(&self) -> &'static str {
        "locale-aware fake text"
    }

    fn replace(
        &self,
        ctx: &mut ReplaceContext<'_>,
        args: &ReplaceArgs<'_>,
    ) -> Result<FieldValue, PolicyError> {
        Ok(ctx.faker.fake(self.kind, Some(args.field), ctx.existing)?)
    }
}

const DEFAULTS: &[FnStrategy] = &[
    FnStrategy {
        id: "varchar",
        param: ParamUse::None,
        summary: "random characters up to max_length",
        replace: varchar,
    },
    FnStrategy {
        id: "simple_pattern",
        param: ParamUse::Required,
        summary: "# becomes a digit, ? a letter",
        replace: simple_pattern,
    },
    FnStrategy {
        id: "constant",
        param: ParamUse::Required,
        summary: "the option parsed as the field kind",
        replace: constant,
    },
    FnStrategy {
        id: "bool",
        param: ParamUse::None,
        summary: "fair coin",
        replace: boolean,
    },
    FnStrategy {
        id: "integer",
        param: ParamUse::None,
        summary: "-1000000 to 1000000",
        replace: integer,
    },
    FnStrategy {
        id: "positive_integer",
        param: ParamUse::None,
        summary: "0 to 1000000",
        replace: positive_integer,
    },
    FnStrategy {
        id: "small_integer",
        param: ParamUse::None,
        summary: "-32768 to 32767",
        replace: small_integer,
    },
    FnStrategy {
        id: "positive_small_integer",
        param: ParamUse::None,
        summary: "0 to 32767",
        replace: positive_small_integer,
    },
    FnStrategy {
        id: "datetime",
        param: ParamUse::Optional,
        summary: "timestamp, within two years of the option when given",
        replace: datetime,
    },
    FnStrategy {
        id: "date",
        param: ParamUse::Optional,
        summary: "date, within two years of the option when given",
        replace: date,
    },
    FnStrategy {
        id: "similar_datetime",
        param: ParamUse::None,
        summary: "timestamp within two years of the current value",
        replace: similar_datetime,
    },
    FnStrategy {
        id: "similar_date",
        param: ParamUse::None,
        summary: "date within two years of the current value",
        replace: similar_date,
    },
    FnStrategy {
        id: "decimal",
        param: ParamUse::None,
        summary: "[0, 1000) at the field's decimal_places",
        replace: decimal,
    },
    FnStrategy {
        id: "lorem",
        param: ParamUse::Optional,
        summary: "lorem ipsum, shaped like the option when given",
        replace: lorem,
    },
    FnStrategy {
        id: "similar_lorem",
        param: ParamUse::None,
        summary: "lorem ipsum shaped like the current value",
        replace: similar_lorem,
    },
    FnStrategy {
        id: "choice",
        param: ParamUse::None,
        summary: "one of the field's declared choices",
        replace: choice,
    },
];

pub fn register(registry: &mut ReplacerRegistry) {
    for strategy in DEFAULTS {
        registry.register_strategy(Box::new(*strategy));
    }
    for &kind in FakerKind::ALL {
        registry.register_strategy(Box::new(FakerStrategy { kind }));
    }
}

/// Empty options behave like absent ones for optional references.
fn reference<'a>(args: &ReplaceArgs<'a>) -> Option<&'a str> {
    args.parameter.filter(|parameter| !parameter.trim().is_empty())
}

fn varchar(ctx: &mut ReplaceContext<'_>, args: &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError> {
    Ok(ctx.faker.varchar(Some(args.field), ctx.existing)?)
}

fn simple_pattern(
    ctx: &mut ReplaceContext<'_>,
    args: &ReplaceArgs<'_>,
) -> Result<FieldValue, PolicyError> {
    let pattern = args.required_parameter("simple_pattern")?;
    Ok(ctx
        .faker
        .simple_pattern(pattern, Some(args.field), ctx.existing)?)
}

fn constant(ctx: &mut ReplaceContext<'_>, args: &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError> {
    let raw = args.required_parameter("constant")?;
    let value = FieldValue::parse_as(args.field, raw)?;
    Ok(ctx
        .faker
        .allowed_value(Some(args.field), ctx.existing, |_| Ok(value.clone()))?)
}

fn boolean(ctx: &mut ReplaceContext<'_>, args: &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError> {
    Ok(ctx.faker.bool(Some(args.field), ctx.existing)?)
}

fn integer(ctx: &mut ReplaceContext<'_>, args: &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError> {
    Ok(ctx.faker.integer(Some(args.field), ctx.existing)?)
}

fn positive_integer(
    ctx: &mut ReplaceContext<'_>,
    args: &ReplaceArgs<'_>,
) -> Result<FieldValue, PolicyError> {
    Ok(ctx.faker.positive_integer(Some(args.field), ctx.existing)?)
}

fn small_integer(
    ctx: &mut ReplaceContext<'_>,
    args: &ReplaceArgs<'_>,
) -> Result<FieldValue, PolicyError> {
    Ok(ctx.faker.small_integer(Some(args.field), ctx.existing)?)
}

fn positive_small_integer(
    ctx: &mut ReplaceContext<'_>,
    args: &ReplaceArgs<'_>,
) -> Result<FieldValue, PolicyError> {
    Ok(ctx
        .faker
        .positive_small_integer(Some(args.field), ctx.existing)?)
}

fn datetime(ctx: &mut ReplaceContext<'_>, args: &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError> {
    let reference = match reference(args) {
        Some(raw) => Some(parse_datetime(raw).ok_or_else(|| {
            PolicyError::Configuration(format!(
                "invalid reference datetime '{raw}' for {}",
                args.field.key()
            ))
        })?),
        None => None,
    };
    Ok(ctx.faker.datetime(Some(args.field), ctx.existing, reference)?)
}

fn date(ctx: &mut ReplaceContext<'_>, args: &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError> {
    let reference = match reference(args) {
        Some(raw) => Some(
            parse_date(raw)
                .or_else(|| parse_datetime(raw).map(|value| value.date()))
                .ok_or_else(|| {
                    PolicyError::Configuration(format!(
                        "invalid reference date '{raw}' for {}",
                        args.field.key()
                    ))
                })?,
        ),
        None => None,
    };
    Ok(ctx.faker.date(Some(args.field), ctx.existing, reference)?)
}

fn similar_datetime(
    ctx: &mut ReplaceContext<'_>,
    args: &ReplaceArgs<'_>,
) -> Result<FieldValue, PolicyError> {
    let reference = args.current.as_datetime();
    Ok(ctx.faker.datetime(Some(args.field), ctx.existing, reference)?)
}

fn similar_date(
    ctx: &mut ReplaceContext<'_>,
    args: &ReplaceArgs<'_>,
) -> Result<FieldValue, PolicyError> {
    let reference = args.current.as_date();
    Ok(ctx.faker.date(Some(args.field), ctx.existing, reference)?)
}

fn decimal(ctx: &mut ReplaceContext<'_>, args: &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError> {
    Ok(ctx.faker.decimal(Some(args.field), ctx.existing)?)
}

fn lorem(ctx: &mut ReplaceContext<'_>, args: &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError> {
    Ok(ctx
        .faker
        .lorem(Some(args.field), ctx.existing, reference(args))?)
}

fn similar_lorem(
    ctx: &mut ReplaceContext<'_>,
    args: &ReplaceArgs<'_>,
) -> Result<FieldValue, PolicyError> {
    let current = args.current.to_string();
    let reference = (!args.current.is_null()).then_some(current.as_str());
    Ok(ctx.faker.lorem(Some(args.field), ctx.existing, reference)?)
}

fn choice(ctx: &mut ReplaceContext<'_>, args: &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError> {
    Ok(ctx.faker.choice(Some(args.field), ctx.existing)?)
}
